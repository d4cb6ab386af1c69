use km200::Client;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example:
    //   cargo run --example read_value -- 192.168.1.30 <gateway_password> <private_password> /system/brand
    let mut args = std::env::args().skip(1);
    let host = args.next().ok_or("missing <host>")?;
    let gateway_password = args.next().ok_or("missing <gateway_password>")?;
    let private_password = args.next().ok_or("missing <private_password>")?;
    let path = args.next().unwrap_or_else(|| "/system".to_owned());

    let client = Client::builder(host)
        .gateway_password(gateway_password)
        .private_password(private_password)
        .build()?;

    let value = client.read_value(&path)?;
    println!("{path}: {value:?}");

    Ok(())
}
