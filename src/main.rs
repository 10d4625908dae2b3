use mailing_list::config::get_configuration;
use mailing_list::startup::Application;
use mailing_list::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(
        String::from("mailing_list"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber);

    let config = get_configuration().expect("Missing configuration file.");
    let application = Application::build(config)
        .await
        .expect("Failed to build application.");

    application.run_until_stop().await
}
