use anyhow::{anyhow, Result};
use bearer_client::api::types::{
    ChangePassword, DeleteUser, LoginUser, NewUser, ResetPassword, SubmitResetPassword, UpdateUser, VerifyUser,
};
use bearer_client::api::ApiClient;
use bearer_client::observability::metrics::get_metrics;
use bearer_client::request::RequestError;
use bearer_client::session::{Session, TokenStore};
use bearer_client::utils::config_loader;
use bearer_client::utils::logging;
use bearer_client::utils::logging::LogLevel;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "bearer-client.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// seed the session with an existing bearer token
    #[arg(long, env = "BEARER_TOKEN")]
    token: Option<String>,
    /// Accept-Language override, defaults to settings.default_lang
    #[arg(long)]
    lang: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BEARER_PASSWORD")]
        password: String,
    },
    Logout,
    LogoutAll,
    PasswordReset {
        #[arg(long)]
        email: String,
    },
    PasswordResetSubmit {
        #[arg(long)]
        reset_token: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirm: String,
    },
    PasswordChange {
        #[arg(long)]
        password_old: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirm: String,
    },
    /// force a token refresh and print the new token
    Refresh,
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirm: String,
    },
    UpdateUser {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        password_confirm: Option<String>,
    },
    DeleteUser {
        #[arg(long)]
        password: String,
    },
    GetUser {
        id: String,
    },
    Me,
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        verify_token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let client_config = config_loader::run(&args.config).await?;
    logging::run(&client_config, args.log_level).await?;

    // -------------------------------
    // 2. Build session and api client
    // -------------------------------

    let store = match args.token {
        Some(token) => TokenStore::with_token(token),
        None => TokenStore::new(),
    };
    let session = Session::with_store(store, client_config.settings.refresh.single_flight);

    let mut api = ApiClient::from_config(&client_config, session)?;
    if let Some(lang) = args.lang {
        api = api.with_lang(lang);
    }

    // -------------------------------
    // 3. Run the command
    // -------------------------------

    info!(base_url = %client_config.settings.base_url, "Dispatching command...");
    let outcome = run_command(&api, args.command).await;

    if client_config.settings.metrics.is_enabled {
        eprintln!("{}", get_metrics().await.encode_text()?);
    }

    match outcome {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Command failed");
            if let Some(payload) = err.payload() {
                eprintln!("{}", serde_json::to_string_pretty(payload)?);
            }
            Err(anyhow!(err))
        }
    }
}

async fn run_command(api: &ApiClient, command: Command) -> Result<Value, RequestError> {
    match command {
        Command::Login { email, password } => to_output(api.login(&LoginUser { email, password }).await?),
        Command::Logout => to_output(api.logout().await?),
        Command::LogoutAll => to_output(api.logout_all().await?),
        Command::PasswordReset { email } => to_output(api.password_reset(&ResetPassword { email }).await?),
        Command::PasswordResetSubmit {
            reset_token,
            password,
            password_confirm,
        } => to_output(
            api.password_reset_submit(&SubmitResetPassword {
                token: reset_token,
                password,
                password_confirm,
            })
            .await?,
        ),
        Command::PasswordChange {
            password_old,
            password,
            password_confirm,
        } => to_output(
            api.password_change(&ChangePassword {
                password_old,
                password,
                password_confirm,
            })
            .await?,
        ),
        Command::Refresh => Ok(json!({ "token": api.refresh().await? })),
        Command::CreateUser {
            name,
            email,
            password,
            password_confirm,
        } => to_output(
            api.create_user(&NewUser {
                name,
                email,
                password,
                password_confirm,
            })
            .await?,
        ),
        Command::UpdateUser {
            name,
            email,
            password,
            password_confirm,
        } => to_output(
            api.update_user(&UpdateUser {
                name,
                email,
                password,
                password_confirm,
            })
            .await?,
        ),
        Command::DeleteUser { password } => to_output(api.delete_user(&DeleteUser { password }).await?),
        Command::GetUser { id } => to_output(api.get_user(&id).await?),
        Command::Me => to_output(api.get_me().await?),
        Command::Verify { email, verify_token } => to_output(
            api.verify_user(&VerifyUser {
                email,
                token: verify_token,
            })
            .await?,
        ),
    }
}

fn to_output<T: Serialize>(value: T) -> Result<Value, RequestError> {
    serde_json::to_value(value).map_err(RequestError::Encode)
}
