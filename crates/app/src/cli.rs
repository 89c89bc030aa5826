//! Command line interface

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use smartlpd_core::validation::{normalize_plate, RegistrationForm};
use smartlpd_core::FineStatus;

use crate::camera::Facing;
use crate::terminal::TerminalUi;
use crate::viewmodel::Controllers;

/// SmartLPD license plate detection and fine management client
#[derive(Parser, Debug)]
#[command(name = "smartlpd", author, version, about)]
pub struct Cli {
    /// Backend origin, e.g. http://localhost:8080
    #[arg(long, global = true, env = "SMARTLPD_BASE_URL")]
    pub base_url: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in
    Login {
        username: String,
        /// Prompted for when omitted
        #[arg(long, env = "SMARTLPD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Detect the plate in an image
    Detect(DetectArgs),
    /// Look up fines for a plate
    Check { plate: String },
    /// Pay a fine
    Pay { id: i64, plate: String },
    /// Fine management (authorities only)
    #[command(subcommand)]
    Fines(FinesCommand),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub full_name: String,
    /// CITIZEN or AUTHORITY
    #[arg(long, default_value = "CITIZEN")]
    pub role: String,
    /// Prompted for (twice) when omitted
    #[arg(long, env = "SMARTLPD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Image file (JPG, PNG, WEBP); when several are given only the first is used
    #[arg(required_unless_present = "camera")]
    pub images: Vec<PathBuf>,
    /// Capture from the camera instead of a file
    #[arg(long, conflicts_with = "images")]
    pub camera: bool,
    /// Use the front camera
    #[arg(long, requires = "camera")]
    pub front: bool,
    /// Copy the result to the clipboard
    #[arg(long)]
    pub copy: bool,
    /// Save the result to license_plate_result.txt
    #[arg(long)]
    pub download: bool,
    /// Hand the plate to fine management
    #[arg(long)]
    pub issue_fine: bool,
}

#[derive(Subcommand, Debug)]
pub enum FinesCommand {
    /// List every fine
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show totals
    Stats,
    /// Export every fine to CSV
    Export,
    /// Issue a new fine
    Issue(IssueArgs),
    /// Mark a fine PAID or CANCELLED
    Status { id: i64, status: FineStatus },
}

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Defaults to the plate handed over by `detect --issue-fine`
    #[arg(long)]
    pub plate: Option<String>,
    #[arg(long)]
    pub violation_type: String,
    #[arg(long)]
    pub amount: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

/// Run one command against the controllers
pub async fn run(command: Command, app: &Controllers, ui: &TerminalUi) -> io::Result<()> {
    match command {
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };
            app.auth.login(&username, &password).await;
        }
        Command::Register(args) => {
            let (password, confirm_password) = match args.password {
                Some(password) => (password.clone(), password),
                None => (prompt("Password: ")?, prompt("Confirm password: ")?),
            };
            let form = RegistrationForm {
                username: args.username,
                email: args.email,
                password,
                confirm_password,
                full_name: args.full_name,
                role: args.role,
            };
            app.auth.register(&form).await;
        }
        Command::Logout => app.auth.logout(),
        Command::Whoami => {
            if app.auth.navigation().greeting.is_none() {
                println!("Not logged in");
            }
        }
        Command::Detect(args) => {
            let detect = &app.detect;
            if detect.on_page_load().await.is_none() {
                return Ok(());
            }

            let loaded = if args.camera {
                let facing = if args.front { Facing::User } else { Facing::Environment };
                detect.open_camera(facing) && detect.capture_image()
            } else {
                detect.drop_files(&args.images)
            };
            if loaded {
                detect.detect().await;
                if args.copy {
                    detect.copy_text();
                }
                if args.download {
                    detect.download_result();
                }
                if args.issue_fine {
                    detect.issue_fine_handoff();
                }
            }
            // Release the camera before exiting
            detect.reset();
        }
        Command::Check { plate } => {
            if app.check_fines.on_page_load().is_some() {
                app.check_fines.check_fines(&plate).await;
            }
        }
        Command::Pay { id, plate } => {
            if app.check_fines.on_page_load().is_some() {
                app.check_fines.pay_fine(id, &normalize_plate(&plate)).await;
            }
        }
        Command::Fines(command) => run_fines(command, app, ui).await,
    }
    Ok(())
}

async fn run_fines(command: FinesCommand, app: &Controllers, ui: &TerminalUi) {
    let manage = &app.manage_fines;
    match command {
        FinesCommand::List { search } => {
            if manage.guard().is_none() {
                return;
            }
            manage.load_all_fines().await;
            if let Some(term) = search {
                manage.search(&term);
            }
            ui.flush_list();
        }
        FinesCommand::Stats => {
            if manage.guard().is_some() {
                manage.load_fine_stats().await;
            }
        }
        FinesCommand::Export => {
            if manage.guard().is_some() {
                manage.load_all_fines().await;
                manage.export_csv();
            }
        }
        FinesCommand::Issue(args) => {
            if !manage.on_page_load().await {
                return;
            }
            let mut form = manage.form();
            if let Some(plate) = args.plate {
                form.license_plate = plate;
            }
            form.violation_type = args.violation_type;
            form.amount = args.amount;
            form.description = args.description;
            manage.set_form(form);
            manage.issue_fine().await;
        }
        FinesCommand::Status { id, status } => {
            if manage.guard().is_some() {
                manage.load_all_fines().await;
                manage.update_fine_status(id, status).await;
            }
        }
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
