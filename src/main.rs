use airside_licensing::config::AppConfig;
use airside_licensing::error::AppError;
use airside_licensing::identity::{StaffIdentity, StaffRole};
use airside_licensing::telemetry;
use airside_licensing::workflows::licensing::{
    licensing_router, seed, views, ApplicantSnapshot, Application, ApplicationStore,
    AttachmentSet, LicenseDetails, LicenseKind, LicensingService, OrientationSession,
    PracticalSession, SubmissionForm, TracingNotifier, TrainingOutcome, Transition,
};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Airside License Register",
    about = "Run the airside operating-license workflow service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect the license register without starting the service
    Register {
        #[command(subcommand)]
        command: RegisterCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum RegisterCommand {
    /// Seed a register and print the manager dashboards and a sample audit trail
    Report(RegisterReportArgs),
}

#[derive(Args, Debug)]
struct RegisterReportArgs {
    /// CSV backlog export to hydrate the register from
    #[arg(long)]
    backlog: Option<PathBuf>,
    /// Evaluation date for the demo walkthrough (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Include every register row in the output
    #[arg(long)]
    list_rows: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Register {
            command: RegisterCommand::Report(args),
        } => run_register_report(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let store = Arc::new(ApplicationStore::new());
    let service = Arc::new(LicensingService::new(store, Arc::new(TracingNotifier)));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(licensing_router(service, config.register.clone()))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "airside license register ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn run_register_report(args: RegisterReportArgs) -> Result<(), AppError> {
    let RegisterReportArgs {
        backlog,
        today,
        list_rows,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let imported = backlog.is_some();

    let store = Arc::new(ApplicationStore::new());
    let service = LicensingService::new(store, Arc::new(TracingNotifier));

    match backlog {
        Some(path) => {
            for entry in seed::backlog_from_path(path)? {
                if let Err(err) = service.submit(entry.form, entry.submitted_on) {
                    eprintln!("skipping backlog row: {err}");
                }
            }
        }
        None => seed_demo_register(&service, today),
    }

    render_register_report(&service, today, imported, list_rows);
    Ok(())
}

/// Built-in walkthrough used when no backlog file is given: a few pending
/// requests plus one driven through sectional approval into training.
fn seed_demo_register<N>(service: &LicensingService<N>, today: NaiveDate)
where
    N: airside_licensing::workflows::licensing::NotificationPublisher,
{
    let sectional = StaffIdentity::new("STF002", "Kamala Silva", StaffRole::SectionalManager);
    let safety = StaffIdentity::new("STF003", "Nimal Fernando", StaffRole::SafetyManager);

    let submissions = [
        demo_submission(
            "Olivia Isabella",
            "423231",
            "Information Technology",
            LicenseKind::Extension,
            &["tractor", "pickUp", "van", "car"],
            today - Duration::days(12),
        ),
        demo_submission(
            "Nuwan Perera",
            "423456",
            "Ground Operations",
            LicenseKind::New,
            &["transporter", "paxCoach", "buggy"],
            today - Duration::days(9),
        ),
        demo_submission(
            "Chamari Silva",
            "423100",
            "Engineering",
            LicenseKind::Extension,
            &["maintPlatLiftTruck", "snorkelLift", "donkeyLift"],
            today - Duration::days(7),
        ),
    ];

    let mut stored: Vec<Application> = Vec::new();
    for (form, submitted_on) in submissions {
        match service.submit(form, submitted_on) {
            Ok(application) => stored.push(application),
            Err(err) => eprintln!("skipping demo submission: {err}"),
        }
    }

    // Walk the first request through the safety stage so the report shows a
    // record mid-training.
    let Some(first) = stored.first() else {
        return;
    };
    let steps: [(&StaffIdentity, NaiveDate, Transition); 4] = [
        (
            &sectional,
            today - Duration::days(10),
            Transition::ApproveSectional {
                categories: None,
                remarks: Some("Cleared for listed equipment.".to_string()),
            },
        ),
        (
            &safety,
            today - Duration::days(8),
            Transition::AcceptAttachments { remarks: None },
        ),
        (
            &safety,
            today - Duration::days(6),
            Transition::AssignOrientation {
                session: OrientationSession {
                    class_date: today - Duration::days(3),
                    class_room: "Training Hall".to_string(),
                    trainer: "Officer Jayasinghe".to_string(),
                },
            },
        ),
        (
            &safety,
            today - Duration::days(3),
            Transition::MarkOrientation {
                outcome: TrainingOutcome::Completed,
                remarks: None,
            },
        ),
    ];
    for (actor, occurred_on, transition) in steps {
        if let Err(err) = service.execute(&first.id, actor, occurred_on, &transition) {
            eprintln!("demo transition failed: {err}");
            return;
        }
    }
    if let Err(err) = service.execute(
        &first.id,
        &safety,
        today - Duration::days(1),
        &Transition::AssignPractical {
            session: PracticalSession {
                test_date: today + Duration::days(2),
                trainer: "Trainer Perera".to_string(),
            },
        },
    ) {
        eprintln!("demo transition failed: {err}");
    }
}

fn demo_submission(
    name: &str,
    staff_number: &str,
    department: &str,
    kind: LicenseKind,
    categories: &[&str],
    submitted_on: NaiveDate,
) -> (SubmissionForm, NaiveDate) {
    let (current_permit_no, first_issued_on) = match kind {
        LicenseKind::Extension => (
            Some(format!("ADP-{}-{staff_number}", submitted_on.year() - 2)),
            Some(submitted_on - Duration::days(730)),
        ),
        LicenseKind::New => (None, None),
    };

    let form = SubmissionForm {
        applicant: ApplicantSnapshot {
            name: name.to_string(),
            staff_number: staff_number.to_string(),
            department: department.to_string(),
            designation: "Officer".to_string(),
            contact_number: "071 000 0000".to_string(),
            national_id: format!("{staff_number}V"),
        },
        license: LicenseDetails {
            kind,
            current_permit_no,
            first_issued_on,
            airside_pass_no: format!("AASL-{staff_number}"),
            airside_pass_expires_on: submitted_on + Duration::days(365),
            state_license_no: format!("B{staff_number}"),
            state_license_issued_on: submitted_on - Duration::days(1460),
            state_license_expires_on: submitted_on + Duration::days(1460),
        },
        selected_categories: categories.iter().map(|key| key.to_string()).collect(),
        attachments: AttachmentSet::default(),
        sectional_manager: "STF002".to_string(),
    };
    (form, submitted_on)
}

fn render_register_report<N>(
    service: &LicensingService<N>,
    today: NaiveDate,
    imported: bool,
    list_rows: bool,
) where
    N: airside_licensing::workflows::licensing::NotificationPublisher,
{
    let applications = service.applications();

    println!("Airside license register");
    println!("Evaluated {today}");
    if imported {
        println!("Data source: CSV backlog import");
    } else {
        println!("Data source: built-in demo walkthrough");
    }

    let sectional = views::sectional_counts(&applications, "STF002");
    println!("\nSectional manager dashboard (STF002)");
    println!("- pending review: {}", sectional.pending);
    println!("- approved: {}", sectional.approved);
    println!("- rejected: {}", sectional.rejected);
    println!("- total routed: {}", sectional.total);

    let safety = views::safety_counts(&applications, "STF003");
    println!("\nSafety manager dashboard (STF003)");
    println!("- awaiting validation: {}", safety.awaiting_validation);
    println!("- in training: {}", safety.in_training);
    println!("- rejected: {}", safety.rejected);
    println!("- total visible: {}", safety.total);

    if list_rows {
        println!("\nRegister rows");
        for application in &applications {
            println!(
                "- {} | {} | {} | submitted {} | {}",
                application.reference_number,
                application.applicant.name,
                application.applicant.staff_number,
                application.submitted_on,
                views::chip_label(application)
            );
        }
    }

    if let Some(application) = applications.first() {
        println!("\nAudit trail for {}", application.reference_number);
        match service.timeline(&application.id) {
            Ok(entries) => {
                for entry in entries {
                    println!(
                        "- {} | {} ({}) | {}",
                        entry.occurred_on, entry.actor, entry.role_label, entry.message
                    );
                }
            }
            Err(err) => eprintln!("timeline unavailable: {err}"),
        }
    }
}
