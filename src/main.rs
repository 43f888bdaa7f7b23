use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cohesity_ops::config::Config;
use cohesity_ops::ops::{self, CreateJob, RestoreVms, UpdateJob};
use cohesity_ops::source::split_names;
use cohesity_ops::{report, CohesityClient};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Cohesity protection job and VM restore automation
#[derive(Parser, Debug)]
#[command(name = "cohesity-ops", version, about, long_about = None)]
struct Args {
    /// Config file (YAML with a `cohesity_config` section)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Cluster VIP or hostname
    #[arg(long, global = true)]
    cluster_vip: Option<String>,

    /// Cluster username
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Cluster authentication domain
    #[arg(long, global = true)]
    domain: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a VMware vCenter as a protection source
    RegisterVcenter {
        #[arg(long)]
        vcenter: String,
        #[arg(long)]
        vcenter_username: String,
        #[arg(long, env = "VCENTER_PASSWORD", hide_env_values = true)]
        vcenter_password: String,
    },

    /// Create a protection job for VMs in a vCenter
    CreateJob {
        #[arg(long)]
        job_name: String,
        #[arg(long)]
        vcenter: String,
        /// Comma separated VM names
        #[arg(long)]
        sources: String,
        #[arg(long, default_value = "Gold")]
        policy: String,
        #[arg(long, default_value = "DefaultStorageDomain")]
        storage_domain: String,
        /// Leave the job paused after creation
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        pause: bool,
        #[arg(long, default_value = "Europe/Berlin")]
        timezone: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Replace or extend the VMs of a protection job
    UpdateJob {
        #[arg(long)]
        job_name: String,
        #[arg(long)]
        vcenter: String,
        /// Comma separated VM names
        #[arg(long)]
        sources: String,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        replace_existing: bool,
    },

    /// Activate, deactivate, pause or resume a protection job
    JobState {
        #[arg(long)]
        job_name: String,
        /// One of activate, deactivate, pause, resume
        #[arg(long)]
        state: String,
    },

    /// Cancel the running run of a protection job
    CancelJob {
        #[arg(long)]
        job_name: String,
    },

    /// Start a protection job run now
    RunJob {
        #[arg(long)]
        job_name: String,
    },

    /// Delete a protection job
    DeleteJob {
        #[arg(long)]
        job_name: String,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        delete_snapshots: bool,
    },

    /// Restore VMs from their latest snapshot
    RestoreVms {
        #[arg(long)]
        task_name: Option<String>,
        #[arg(long)]
        vcenter: String,
        /// Comma separated VM names
        #[arg(long)]
        vm_names: String,
        #[arg(long, default_value = "")]
        resource_pool: String,
        #[arg(long, default_value = "")]
        datastore: String,
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long, default_value = "")]
        suffix: String,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        powered_on: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("cohesity-ops started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("cohesity-ops").join("cohesity-ops.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".cohesity-ops").join("cohesity-ops.log");
    }
    PathBuf::from("cohesity-ops.log")
}

/// Run one command, returning a description of it for error reports and
/// its outcome
async fn dispatch(client: &CohesityClient, command: Command) -> (String, cohesity_ops::Result<String>) {
    match command {
        Command::RegisterVcenter {
            vcenter,
            vcenter_username,
            vcenter_password,
        } => (
            format!("register the Vcenter {}", vcenter),
            ops::register_vcenter(client, &vcenter, &vcenter_username, &vcenter_password).await,
        ),
        Command::CreateJob {
            job_name,
            vcenter,
            sources,
            policy,
            storage_domain,
            pause,
            timezone,
            description,
        } => {
            let req = CreateJob {
                policy,
                storage_domain,
                pause,
                timezone,
                description,
                ..CreateJob::new(&job_name, &vcenter, split_names(&sources))
            };
            (
                format!("create the job {}", job_name),
                ops::create_job(client, &req).await,
            )
        }
        Command::UpdateJob {
            job_name,
            vcenter,
            sources,
            replace_existing,
        } => {
            let req = UpdateJob {
                name: job_name.clone(),
                vcenter,
                sources: split_names(&sources),
                replace_existing,
            };
            (
                format!("update the job {}", job_name),
                ops::update_job(client, &req).await,
            )
        }
        Command::JobState { job_name, state } => (
            format!("{} the job {}", state, job_name),
            ops::change_job_state(client, &job_name, &state).await,
        ),
        Command::CancelJob { job_name } => (
            format!("cancel the job {}", job_name),
            ops::cancel_job_run(client, &job_name).await,
        ),
        Command::RunJob { job_name } => (
            format!("start the job {}", job_name),
            ops::run_job(client, &job_name).await,
        ),
        Command::DeleteJob {
            job_name,
            delete_snapshots,
        } => (
            format!("delete the job {}", job_name),
            ops::delete_job(client, &job_name, delete_snapshots).await,
        ),
        Command::RestoreVms {
            task_name,
            vcenter,
            vm_names,
            resource_pool,
            datastore,
            prefix,
            suffix,
            powered_on,
        } => {
            let task_name =
                task_name.unwrap_or_else(|| ops::default_task_name(chrono::Utc::now()));
            let req = RestoreVms {
                resource_pool,
                datastore,
                prefix,
                suffix,
                powered_on,
                ..RestoreVms::new(&task_name, &vcenter, split_names(&vm_names))
            };
            (
                format!("create the restore task {}", task_name),
                ops::restore_vms(client, &req).await,
            )
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(vip) = args.cluster_vip {
        config.cluster_vip = vip;
    }
    if let Some(username) = args.username {
        config.username = username;
    }
    if let Some(domain) = args.domain {
        config.domain = Some(domain);
    }
    if args.insecure {
        config.verify_tls = Some(false);
    }

    tracing::info!("Using cluster: {}", config.cluster_vip);

    let client = CohesityClient::new(&config.connection())?;

    let (operation, result) = dispatch(&client, args.command).await;
    let ok = result.is_ok();
    let message = report(&operation, result);

    if ok {
        println!("{}", message);
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{}", message);
        Ok(ExitCode::FAILURE)
    }
}
