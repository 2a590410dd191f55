use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::notify::{LogNotifier, Notifier, SmtpNotifier};

/// Serve the peer-to-peer balance transfer ledger
#[derive(Parser, Debug)]
#[command(name = "peerpay")]
#[command(about = "Peer-to-peer balance transfer ledger service", long_about = None)]
pub struct CliArgs {
    /// SQLite database file; created on first run
    #[arg(
        long = "db",
        value_name = "PATH",
        default_value = "peerpay.db",
        help = "Path to the SQLite ledger database"
    )]
    pub database: PathBuf,

    /// Address the HTTP API listens on
    #[arg(
        long = "bind",
        value_name = "ADDR",
        default_value = "0.0.0.0:5000",
        help = "Socket address to bind the HTTP API on"
    )]
    pub bind: SocketAddr,

    /// SMTP relay host; notification intents are logged only when unset
    #[arg(long = "smtp-server", value_name = "HOST")]
    pub smtp_server: Option<String>,

    /// SMTP relay port
    #[arg(long = "smtp-port", value_name = "PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// SMTP authentication username
    #[arg(long = "smtp-username", value_name = "USER", env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    /// SMTP authentication password
    #[arg(
        long = "smtp-password",
        value_name = "PASS",
        env = "SMTP_PASSWORD",
        hide_env_values = true
    )]
    pub smtp_password: Option<String>,
}

impl CliArgs {
    /// Build the notifier selected by these arguments
    ///
    /// With `--smtp-server` set an [`SmtpNotifier`] is constructed
    /// (credentials attach only when both username and password are
    /// present); otherwise notification intents go to the log.
    pub fn notifier(&self) -> Box<dyn Notifier> {
        match &self.smtp_server {
            Some(server) => {
                let credentials = self.smtp_username.clone().zip(self.smtp_password.clone());
                Box::new(SmtpNotifier::new(
                    server.clone(),
                    self.smtp_port,
                    credentials,
                ))
            }
            None => Box::new(LogNotifier::new()),
        }
    }
}
