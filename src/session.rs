// The whole run: resolve the data file, load it, then either greet the
// last user or create one, persist, and show the welcome banner.

use crate::config::AppConfig;
use crate::document::{self, UserDataDocument, UserRecord};
use crate::error::{AppError, Result};
use crate::prompt::Prompt;
use crate::storage::{self, Resolution};
use crate::terminal::Terminal;
use chrono::{Local, NaiveDateTime};
use log::{error, info, warn};

const CORRUPT_CHOICES: [&str; 2] = ["delete", "exit"];
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const WELCOME_BANNER: &str = "Welcome to the Finances app.";

/// How a run ended. Only `Completed` is a successful exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    /// The data file was corrupt and the user chose to delete it.
    DataDeleted,
    /// The data file was corrupt and the user chose to exit.
    Exited,
}

impl SessionOutcome {
    pub fn is_success(self) -> bool {
        self == SessionOutcome::Completed
    }
}

pub struct Session<'a, T: Terminal> {
    config: &'a AppConfig,
    prompt: Prompt<T>,
    clock: fn() -> NaiveDateTime,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl<'a, T: Terminal> Session<'a, T> {
    pub fn new(config: &'a AppConfig, term: T) -> Self {
        Session {
            config,
            prompt: Prompt::new(term),
            clock: local_now,
        }
    }

    /// Replace the wall clock used to stamp the document.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn terminal(&self) -> &T {
        self.prompt.terminal()
    }

    /// Tell the user (and the log) what resolving the data file created.
    pub fn report(&mut self, resolution: Resolution) -> Result<()> {
        resolution.log(self.config);
        for line in resolution.messages() {
            self.say(line)?;
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<SessionOutcome> {
        let resolution = storage::resolve(self.config)?;
        self.report(resolution)?;

        let bytes = storage::read(self.config)?;
        let mut doc = match document::decode(&bytes) {
            Ok(doc) => doc,
            Err(AppError::Decode(err)) => {
                error!("Failed to decode {}: {}", self.config.data_file.display(), err);
                return self.handle_corrupt_file();
            }
            Err(err) => return Err(err),
        };
        info!("Loaded {} user(s)", doc.users.len());

        match doc.last_user.clone() {
            Some(user) => self.greet(&user, doc.last_modified_date)?,
            None => self.create_user(&mut doc)?,
        }

        self.prompt.terminal_mut().clear_screen()?;
        self.say(WELCOME_BANNER)?;
        Ok(SessionOutcome::Completed)
    }

    fn say(&mut self, line: &str) -> Result<()> {
        self.prompt.terminal_mut().write_raw(&format!("{line}\n"))?;
        Ok(())
    }

    /// Both choices end the run.
    fn handle_corrupt_file(&mut self) -> Result<SessionOutcome> {
        self.say("ERROR: Failed to deserialize JSON data.")?;
        let choice = self.prompt.ask_line(
            "Type DELETE to delete user data, or EXIT to close the app.",
            Some(&CORRUPT_CHOICES[..]),
        )?;

        if choice.to_lowercase() == "delete" {
            storage::delete(self.config)?;
            self.say("SYSTEM: User data deleted. Exiting program.")?;
            Ok(SessionOutcome::DataDeleted)
        } else {
            warn!("Exiting with corrupt data file left in place");
            self.say("SYSTEM: Exiting program.")?;
            Ok(SessionOutcome::Exited)
        }
    }

    fn greet(&mut self, user: &UserRecord, modified: Option<NaiveDateTime>) -> Result<()> {
        let date = modified
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        self.say(&format!("Last User: {}", user.username))?;
        self.say(&format!("Last Modified Date: {date}"))?;
        info!("Greeted last user id={}", user.id);
        Ok(())
    }

    fn create_user(&mut self, doc: &mut UserDataDocument) -> Result<()> {
        self.say("CREATE USER ACCOUNT\n")?;

        let name = self.prompt.ask_line("Your name:", None)?;
        let username = self.prompt.ask_line("Username:", None)?;
        let password = self.prompt.ask_masked_line("Password:")?;

        let id = doc.add_user(name, username, password).id;
        doc.touch((self.clock)());

        let resolution = storage::resolve(self.config)?;
        self.report(resolution)?;
        storage::write(self.config, doc)?;
        info!("Created user id={}", id);
        Ok(())
    }
}
