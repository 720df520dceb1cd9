#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use serde_json::json;

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let report = broadside::local_match(seed1, seed2).await?;

    let winner = report.winner().map(|n| format!("player{}", n));
    let result = json!({
        "player1": {"status": format!("{:?}", report.first.0), "attacks": report.first.1},
        "player2": {"status": format!("{:?}", report.second.0), "attacks": report.second.1},
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
