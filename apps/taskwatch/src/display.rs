//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use std::io;
use taskwatch_tracker::reconcile::reconcile;
use taskwatch_tracker::{TaskCard, TrackedTask};
use taskwatch_types::{CardStyle, ColorChoice, Severity, StatusPayload, TaskState, TaskType};

/// Final outcome of one watched task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub task_id: String,
    pub title: String,
    pub state: TaskState,
    pub progress: u8,
    pub status_message: String,
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render a one-off status query
    ///
    /// The payload is run through the same reconciliation a tracked card
    /// gets, so the output matches what `watch` would show.
    pub fn render_status(&self, task_id: &str, payload: &StatusPayload) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::json!({ "task_id": task_id, "status": payload });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).map_err(io::Error::other)?
            );
            return Ok(());
        }

        let mut task = TrackedTask::new(task_id, TaskType::Single, serde_json::Value::Null);
        let mut card = TaskCard::new(TaskType::Single);
        let outcome = reconcile(&mut task, &mut card, payload);

        println!("{}", self.style_heading(task_id));
        println!();
        println!("State:    {}", self.style_state(task.state));
        println!("Progress: {}", card.progress_text());
        println!("Status:   {}", card.status_message);
        if let Some(stage) = &task.stage {
            println!("Stage:    {stage}");
        }
        if !card.detail.is_empty() {
            println!("Detail:   {}", card.detail);
        }

        if !outcome.logs.is_empty() {
            println!();
            for line in &outcome.logs {
                println!("  {}", self.style_severity(line.severity, &line.message));
            }
        }

        Ok(())
    }

    /// Render the summary printed once watching ends
    pub fn render_summary(&self, outcomes: &[TaskOutcome]) -> io::Result<()> {
        if self.json_output {
            let json: Vec<_> = outcomes
                .iter()
                .map(|o| {
                    serde_json::json!({
                        "task_id": o.task_id,
                        "state": o.state,
                        "progress": o.progress,
                        "status": o.status_message,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&json).map_err(io::Error::other)?
            );
            return Ok(());
        }

        if outcomes.is_empty() {
            println!("No tasks were tracked.");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("State").add_attribute(Attribute::Bold),
            Cell::new("Progress").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

        for outcome in outcomes {
            table.add_row(vec![
                Cell::new(&outcome.task_id),
                Cell::new(&outcome.title),
                self.format_state_cell(outcome.state),
                Cell::new(format!("{}%", outcome.progress)),
                Cell::new(&outcome.status_message),
            ]);
        }

        println!("{table}");
        Ok(())
    }

    fn format_state_cell(&self, state: TaskState) -> Cell {
        let cell = Cell::new(state.as_str());
        if !self.supports_color() {
            return cell;
        }
        match state {
            TaskState::Success => cell.fg(Color::Green),
            TaskState::Failure => cell.fg(Color::Red),
            TaskState::TimedOut => cell.fg(Color::Yellow),
            TaskState::Cancelled => cell.fg(Color::DarkGrey),
            TaskState::Pending | TaskState::Progress => cell.fg(Color::Blue),
        }
    }

    fn style_heading(&self, text: &str) -> String {
        if self.supports_color() {
            Style::new().bold().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn style_state(&self, state: TaskState) -> String {
        if !self.supports_color() {
            return state.as_str().to_string();
        }
        let style = match state {
            TaskState::Success => Style::new().green(),
            TaskState::Failure => Style::new().red(),
            TaskState::TimedOut => Style::new().yellow(),
            TaskState::Cancelled => Style::new().dim(),
            TaskState::Pending | TaskState::Progress => Style::new().blue(),
        };
        style.apply_to(state.as_str()).to_string()
    }

    /// Style a message by severity
    pub fn style_severity(&self, severity: Severity, message: &str) -> String {
        let tag = match severity {
            Severity::Info => "[INFO]",
            Severity::Success => "[OK]",
            Severity::Warning => "[WARN]",
            Severity::Error => "[ERROR]",
        };
        if !self.supports_color() {
            return format!("{tag} {message}");
        }
        let style = match severity {
            Severity::Info => Style::new().cyan(),
            Severity::Success => Style::new().green(),
            Severity::Warning => Style::new().yellow(),
            Severity::Error => Style::new().red(),
        };
        format!("{} {message}", style.apply_to(tag))
    }

    /// Style a card line by its visual state
    pub fn style_card(&self, style: CardStyle, text: &str) -> String {
        if !self.supports_color() {
            return text.to_string();
        }
        let style = match style {
            CardStyle::Active => Style::new(),
            CardStyle::Succeeded => Style::new().green(),
            CardStyle::Failed => Style::new().red(),
            CardStyle::TimedOut => Style::new().yellow(),
            CardStyle::Cancelled => Style::new().dim(),
        };
        style.apply_to(text).to_string()
    }

    /// Check if colors are supported
    pub fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}
