#[macro_use]
extern crate rocket;

use firemap::{config::read_config, manager::Manager, web};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::sync::Arc;

#[launch]
async fn rocket() -> _ {
  let config = read_config(None);

  if let Err(err) = TermLogger::init(
    config.log.level,
    Config::default(),
    TerminalMode::Stdout,
    ColorChoice::Always,
  ) {
    eprintln!("error setting logger up: {err}");
  }

  let m = Manager::new(config).await;
  web::build(Arc::new(m))
}
