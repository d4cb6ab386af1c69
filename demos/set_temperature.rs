use km200::Client;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example:
    //   cargo run --example set_temperature -- 192.168.1.30 <gateway_password> <private_password> \
    //       /heatingCircuits/hc1/temperatureRoomSetpoint 21.5
    let mut args = std::env::args().skip(1);
    let host = args.next().ok_or("missing <host>")?;
    let gateway_password = args.next().ok_or("missing <gateway_password>")?;
    let private_password = args.next().ok_or("missing <private_password>")?;
    let path = args.next().ok_or("missing <path>")?;
    let value: f64 = args.next().ok_or("missing <value>")?.parse()?;

    let client = Client::builder(host)
        .gateway_password(gateway_password)
        .private_password(private_password)
        .build()?;

    client.write_float(&path, value)?;

    // Read back to confirm the device accepted it.
    let confirmed = client.read_float(&path)?;
    println!("{path} = {confirmed}");

    Ok(())
}
