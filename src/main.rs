extern crate structopt;

use std::io::{self, BufRead, Write};
use std::process::exit;
use std::time::Duration;

use structopt::StructOpt;
use user_manager::accounts::{
    account::Field,
    client::{AccountApi, Client},
    config::{Config, DEFAULT_API_ADDRESS, DEFAULT_CLIENT_TIMEOUT},
    error::SessionError,
    session::{AccountSession, Screen},
    types::ApiAddress,
};

#[derive(StructOpt, Debug)]
#[structopt(name = "user-manager")]
struct Opt {
    #[structopt(long = "api-address", default_value = DEFAULT_API_ADDRESS)]
    api_address: String,

    /// Request timeout, in seconds
    #[structopt(long = "timeout", default_value = "30")]
    timeout: u64,

    #[structopt(long = "log-level", default_value = "warn")]
    log_level: String,
}

#[derive(Debug, PartialEq)]
enum Command {
    LogIn,
    SignUp,
    Login(String),
    Edit,
    Delete,
    Back,
    Set(Field, String),
    Save,
    Quit,
}

fn main() {
    let opt = Opt::from_args();
    init_logging(&opt.log_level);

    if opt.timeout == 0 {
        eprintln!("Timeout must be at least one second (default {DEFAULT_CLIENT_TIMEOUT})");
        exit(1)
    }
    let config = Config::new(
        ApiAddress(opt.api_address),
        Duration::from_secs(opt.timeout),
    );
    let mut session = AccountSession::new(Client::new(config));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        render(&session);

        if session.screen() == Screen::Loading {
            if let Err(error) = session.finish_loading() {
                notify(&error);
            }
            continue;
        }

        if let Err(error) = prompt(&mut io::stdout()) {
            tracing::warn!("Unable to write prompt: {}", error);
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(error)) => {
                eprintln!("Unable to read input: {}", error);
                exit(1)
            }
            None => break,
        };

        let command = match parse_command(session.screen(), &line) {
            Some(Command::Quit) => break,
            Some(command) => command,
            None => {
                println!("Unknown command '{}'", line.trim());
                continue;
            }
        };
        if let Err(error) = apply(&mut session, command) {
            notify(&error);
        }
    }
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("user_manager={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn parse_command(screen: Screen, line: &str) -> Option<Command> {
    let line = line.trim();
    if line == "q" || line == "quit" {
        return Some(Command::Quit);
    }

    match screen {
        Screen::Entrance => match line {
            "l" | "login" => Some(Command::LogIn),
            "s" | "signup" => Some(Command::SignUp),
            _ => None,
        },
        Screen::LoggingIn => match line {
            "back" => Some(Command::Back),
            login => Some(Command::Login(login.to_string())),
        },
        Screen::NotFound => match line {
            "b" | "back" => Some(Command::Back),
            _ => None,
        },
        Screen::Viewing => match line {
            "e" | "edit" => Some(Command::Edit),
            "d" | "delete" => Some(Command::Delete),
            "b" | "back" | "logout" => Some(Command::Back),
            _ => None,
        },
        Screen::Creating | Screen::Editing => match line {
            "save" => Some(Command::Save),
            "back" => Some(Command::Back),
            assignment => {
                let (field, value) = assignment.split_once('=')?;
                Some(Command::Set(Field::from_str(field.trim())?, value.to_string()))
            }
        },
        Screen::Loading => None,
    }
}

fn apply<A: AccountApi>(
    session: &mut AccountSession<A>,
    command: Command,
) -> Result<(), SessionError> {
    match command {
        Command::LogIn => session.request_log_in(),
        Command::SignUp => session.request_sign_up(),
        Command::Login(login) => session.submit_login(&login),
        Command::Edit => session.request_edit(),
        Command::Delete => session.request_delete(),
        Command::Back => session.request_back(),
        Command::Set(field, value) => session.set_field(field, value),
        Command::Save => session.request_save(),
        Command::Quit => Ok(()),
    }
}

fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

fn notify(error: &SessionError) {
    println!();
    println!("!! {}", error);
}

fn render<A: AccountApi>(session: &AccountSession<A>) {
    println!();
    match session.screen() {
        Screen::Entrance => {
            println!("[l] Log in");
            println!("    or");
            println!("[s] Sign up");
        }
        Screen::LoggingIn => {
            println!("Login (or 'back'):");
        }
        Screen::Loading => {
            println!("User is loading...");
        }
        Screen::NotFound => {
            println!(
                "User {} not found!",
                session.pending_login().unwrap_or_default()
            );
            println!("[b] Back");
        }
        Screen::Viewing => {
            println!("[b] Log Out   [e] Edit   [d] Delete");
            if let Some(account) = session.confirmed() {
                println!("Name:     {}", account.name);
                println!("Birthday: {}", account.birthday_str());
                println!("Sex:      {}", account.sex);
                println!("Login:    {}", account.login);
                println!("Password: {}", account.password.0);
            }
        }
        Screen::Creating | Screen::Editing => {
            println!("back   save   <field>=<value>");
            for field in Field::ALL {
                println!("{:<9} {}", field.as_str(), session.draft().get(field));
            }
        }
    }
}
