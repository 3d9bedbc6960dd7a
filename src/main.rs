//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::fs;
use std::io::{self, stdin, stdout, Write};

use marathon_coach_lib::dates::DAY_COLUMNS;
use marathon_coach_lib::plan::cell_date;
use marathon_coach_lib::{
    format_date, importer, next_monday_on_or_after, AppService, AppState, Dialog,
    LoggedWorkoutEntry, LogForm, PlanPosition, TrainingPlan, Units, View, WorkoutLogs,
};

fn main() -> Result<()> {
    env_logger::init();

    // --- Check for completion generation request FIRST ---
    let cli_args = cli::parse_args();
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    // Initialize the application service (loads config, opens the store)
    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;
    // A startup notice (corrupt data) has to be acknowledged before anything else
    acknowledge_notice(&mut service.state)?;

    let header_color = Color::from(service.header_color());
    let units = service.config.units;

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Import { file, start } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read schedule file {file:?}"))?;
            let start = start.unwrap_or_else(|| next_monday_on_or_after(service.state.today()));
            let state = &mut service.state;
            if state.view() != View::Import {
                state.open_import()?;
            }
            match state.import_plan(start, &text) {
                Ok(_) => acknowledge_notice(state)?,
                Err(e) => bail!("Error importing {file:?}: {e}"),
            }
        }
        cli::Commands::Today => {
            let state = &service.state;
            let today = state.today();
            let position = state.locate(today);
            if !position.is_loaded() {
                bail!("No training plan loaded. Import one with `coach import <FILE>`.");
            }
            print_today_table(&position, today, state.is_logged(today), header_color);
        }
        cli::Commands::Plan => {
            let Some(plan) = service.state.plan() else {
                bail!("No training plan loaded. Import one with `coach import <FILE>`.");
            };
            if export_csv {
                importer::write_schedule(&plan.weeks, io::stdout())?;
            } else {
                print_plan_table(plan, service.state.logs(), service.state.today(), header_color);
            }
        }
        cli::Commands::Log {
            date,
            distance,
            time,
            pace,
            heart_rate,
            link,
        } => {
            let state = &mut service.state;
            let date = date.unwrap_or_else(|| state.today());
            if let View::Detail { .. } = open_day(state, date)? {
                state.edit()?;
            }
            let mut form = LogForm::for_day(state.entry(date).map(|entry| &entry.log), units);
            for (field, value) in [
                (&mut form.distance, distance),
                (&mut form.duration, time),
                (&mut form.pace, pace),
                (&mut form.avg_heart_rate, heart_rate),
                (&mut form.external_link, link),
            ] {
                if let Some(value) = value {
                    *field = value;
                }
            }
            if let Err(e) = state.submit_log(&form) {
                bail!("Error logging workout for {}: {e}", format_date(date));
            }
            acknowledge_notice(state)?;
        }
        cli::Commands::Show { date } => {
            let state = &service.state;
            let date = date.unwrap_or_else(|| state.today());
            match state.entry(date) {
                Some(entry) => print_entry_table(date, entry, units, header_color),
                None => {
                    println!("No workout logged for {}.", format_date(date));
                    if let Some(activity) = state.locate(date).activity() {
                        println!("Planned: {activity}");
                    }
                }
            }
        }
        cli::Commands::Delete { date, yes } => {
            let state = &mut service.state;
            let date = date.unwrap_or_else(|| state.today());
            if !matches!(open_day(state, date)?, View::Detail { .. }) {
                bail!("No workout logged for {}.", format_date(date));
            }
            state.request_delete()?;

            let confirmed = yes || prompt_confirmation(state.dialog().dialog())?;
            if confirmed {
                state.dismiss_dialog()?;
                acknowledge_notice(state)?;
            } else {
                state.cancel_dialog()?;
                println!("Deletion cancelled.");
            }
        }
        cli::Commands::History => {
            let logs = service.state.logs();
            if logs.is_empty() {
                println!("No workouts logged yet.");
            } else if export_csv {
                print_history_csv(logs, units)?;
            } else {
                print_history_table(logs, units, header_color);
            }
        }
        cli::Commands::SetUnits { units } => {
            let units = match units {
                cli::UnitsCli::Metric => Units::Metric,
                cli::UnitsCli::Imperial => Units::Imperial,
            };
            service
                .set_units(units)
                .context("Failed to save unit preference")?;
            println!("Units set to {units:?}.");
        }
        cli::Commands::SetHeaderColor { color } => match service.set_header_color(&color) {
            Ok(parsed) => println!("Header color set to {parsed:?}."),
            Err(e) => bail!("Error setting header color: {e}"),
        },
        cli::Commands::DbPath => {
            println!("Database file is located at: {:?}", service.get_db_path());
        }
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
    }

    Ok(())
}

/// Drives the controller to the dated view for `date`: straight from the
/// dashboard for today, through the plan grid for any other day.
fn open_day(state: &mut AppState, date: NaiveDate) -> Result<View> {
    if state.plan().is_none() {
        bail!("No training plan loaded. Import one with `coach import <FILE>`.");
    }
    let view = if date == state.today() {
        state.open_today()?
    } else {
        state.show_full_plan()?;
        state
            .select_day(date)
            .with_context(|| format!("Cannot open {}", format_date(date)))?
    };
    Ok(view)
}

/// Prints the open notice, if any, and presses its dismiss button.
fn acknowledge_notice(state: &mut AppState) -> Result<()> {
    if let Dialog::Notice(notice) = state.dialog().dialog() {
        println!("{}: {}", notice.title, notice.message);
        state.dismiss_dialog()?;
    }
    Ok(())
}

fn prompt_confirmation(dialog: &Dialog) -> Result<bool> {
    let Dialog::Confirm(pending) = dialog else {
        return Ok(false);
    };
    println!("{}", pending.title);
    print!("{} (y/N): ", pending.message);
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

// --- Table Printing Functions ---

fn new_table(headers: &[String], header_color: Color) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(header_color))
                .collect::<Vec<_>>(),
        );
    table
}

fn print_today_table(position: &PlanPosition, today: NaiveDate, logged: bool, header_color: Color) {
    let headers = ["Date", "Week", "Day", "Planned", "Status"].map(String::from);
    let mut table = new_table(&headers, header_color);
    let status = if logged { "Logged ✓" } else { "Not logged" };
    table.add_row(vec![
        Cell::new(format_date(today)),
        Cell::new(position.week_label().unwrap_or("-")),
        Cell::new(position.day().map_or("-", |day| day.label())),
        Cell::new(position.activity().unwrap_or("-")).add_attribute(Attribute::Bold),
        Cell::new(status),
    ]);
    println!("{table}");
}

fn print_plan_table(plan: &TrainingPlan, logs: &WorkoutLogs, today: NaiveDate, header_color: Color) {
    let mut headers = vec!["Week".to_string()];
    headers.extend(DAY_COLUMNS.iter().map(|day| day.label().to_string()));
    let mut table = new_table(&headers, header_color);

    for (week_index, row) in plan.weeks.iter().enumerate() {
        let mut cells = vec![Cell::new(&row.week_label)];
        for (day_index, day) in DAY_COLUMNS.iter().enumerate() {
            let date = cell_date(plan.start_date, week_index, day_index);
            let mut text = row.activity(*day).to_string();
            if logs.contains_key(&date) {
                text.push_str(" ✓");
            }
            let cell = Cell::new(text);
            cells.push(if date == today {
                cell.add_attribute(Attribute::Bold).fg(header_color)
            } else {
                cell
            });
        }
        table.add_row(cells);
    }
    println!(
        "Plan: {} to {}",
        format_date(plan.start_date),
        format_date(plan.end_date())
    );
    println!("{table}");
}

fn print_entry_table(date: NaiveDate, entry: &LoggedWorkoutEntry, units: Units, header_color: Color) {
    let headers = ["Field", "Value"].map(String::from);
    let mut table = new_table(&headers, header_color);
    let log = &entry.log;
    let rows = [
        ("Date", format_date(date)),
        ("Planned", entry.planned_activity.clone()),
        (
            "Distance",
            format!("{:.2} {}", units.display_distance(log.distance), units.distance_label()),
        ),
        ("Time", log.duration.clone()),
        ("Pace", log.pace.clone()),
        (
            "Avg HR",
            log.avg_heart_rate.map_or("-".to_string(), |hr| format!("{hr} bpm")),
        ),
        ("Link", log.external_link.clone().unwrap_or_else(|| "-".to_string())),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    println!("{table}");
}

fn print_history_table(logs: &WorkoutLogs, units: Units, header_color: Color) {
    let headers = [
        "Date".to_string(),
        "Planned".to_string(),
        format!("Distance ({})", units.distance_label()),
        "Time".to_string(),
        "Pace".to_string(),
        "Avg HR".to_string(),
        "Link".to_string(),
    ];
    let mut table = new_table(&headers, header_color);
    for (date, entry) in logs {
        let log = &entry.log;
        table.add_row(vec![
            Cell::new(format_date(*date)),
            Cell::new(&entry.planned_activity),
            Cell::new(format!("{:.2}", units.display_distance(log.distance))),
            Cell::new(&log.duration),
            Cell::new(&log.pace),
            Cell::new(log.avg_heart_rate.map_or("-".to_string(), |hr| hr.to_string())),
            Cell::new(log.external_link.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

fn print_history_csv(logs: &WorkoutLogs, units: Units) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record([
        "Date".to_string(),
        "Planned".to_string(),
        format!("Distance_{}", units.distance_label()),
        "Time".to_string(),
        "Pace".to_string(),
        "Avg_HR".to_string(),
        "Link".to_string(),
    ])?;
    for (date, entry) in logs {
        let log = &entry.log;
        writer.write_record([
            format_date(*date),
            entry.planned_activity.clone(),
            format!("{:.2}", units.display_distance(log.distance)),
            log.duration.clone(),
            log.pace.clone(),
            log.avg_heart_rate.map(|hr| hr.to_string()).unwrap_or_default(),
            log.external_link.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
