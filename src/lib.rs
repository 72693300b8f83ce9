pub mod cli;
pub mod config;
pub mod fuzzer;
pub mod portscan;
pub mod probe;
pub mod recon;
pub mod sink;
pub mod wordlist;
