pub mod init;
pub mod ledger;
