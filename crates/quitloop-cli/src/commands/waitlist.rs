use clap::Subcommand;
use quitloop_core::{Config, WaitlistClient, WaitlistOutcome};

#[derive(Subcommand)]
pub enum WaitlistAction {
    /// Join the early-access waitlist
    Join {
        /// Email address
        email: String,
        /// Override the configured endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },
}

pub fn run(action: WaitlistAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        WaitlistAction::Join { email, endpoint } => {
            let mut waitlist = config.waitlist.clone();
            if let Some(endpoint) = endpoint {
                waitlist.endpoint = endpoint;
            }
            let client = WaitlistClient::from_config(&waitlist)?;

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            match runtime.block_on(client.join(&email))? {
                WaitlistOutcome::Joined => println!("Thanks — you’re on the list."),
                WaitlistOutcome::AlreadyListed => println!("You’re already on the list."),
            }
        }
    }
    Ok(())
}
