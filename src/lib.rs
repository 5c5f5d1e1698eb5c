// Library root
// -----------
// The binary (`main.rs`) resolves the configuration once and hands it to
// the session. Everything it needs lives here so the flow can be driven
// headlessly from tests.
//
// Module responsibilities:
// - `config`: where the data file and log file live.
// - `storage`: creates the data file on first run, reads/writes/deletes it.
// - `document`: the persisted user-data document and its JSON codec.
// - `terminal`: the terminal capabilities the prompts need, with a
//   crossterm back-end and a scripted one.
// - `prompt`: validated line input and masked password input.
// - `session`: the load -> greet or create user -> persist flow.
pub mod config;
pub mod document;
pub mod error;
pub mod logger;
pub mod prompt;
pub mod session;
pub mod storage;
pub mod terminal;

pub use error::{AppError, Result};
