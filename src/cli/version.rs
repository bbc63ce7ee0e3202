/// Display version information
pub fn execute() {
    println!("ledgerfeed {}", env!("CARGO_PKG_VERSION"));
    println!("Ledger-indexed news submission and verification");
}
