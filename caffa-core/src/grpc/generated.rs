// Regenerate with `cargo run --bin generate-caffa-service --features gen-proto`
pub mod caffa_rpc {
    include!("generated/caffa.rpc.rs");
}
