use crate::calendar::{
    to_calendar_event_with_duration, CalendarEvent, CalendarService, EventReceipt, GoogleCalendarClient,
};
use crate::cli::{Cli, Commands, ConfigActions, DateArgs};
use crate::config::{get_config_path, Config};
use crate::env_manager::KNOWN_ENV_VARS;
use crate::extract::{ActionItem, ActionItemExtractor, DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES};
use crate::llm::{LanguageModel, ModelFactory};
use crate::notify::notify;
use crate::reader::{read_note, MarkdownReader};
use anyhow::{anyhow, ensure, Context, Result};
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Outcome of processing one note
#[derive(Debug, Default)]
pub struct RunReport {
    pub note_found: bool,
    pub action_items: Vec<ActionItem>,
    pub events: Vec<CalendarEvent>,
    pub receipts: Vec<EventReceipt>,
    pub deleted: usize,
}

impl RunReport {
    pub fn events_added(&self) -> bool {
        !self.receipts.is_empty()
    }
}

/// Extracts action items from notes and puts them on a calendar.
///
/// Without a calendar the manager still builds events but never sends them.
pub struct EventManager<'a> {
    model: &'a dyn LanguageModel,
    calendar: Option<&'a dyn CalendarService>,
    timezone: Tz,
    default_duration_minutes: i64,
}

impl<'a> EventManager<'a> {
    pub fn new(model: &'a dyn LanguageModel, calendar: Option<&'a dyn CalendarService>, timezone: Tz) -> Self {
        Self { model, calendar, timezone, default_duration_minutes: DEFAULT_DURATION_MINUTES }
    }

    pub fn with_default_duration(mut self, minutes: i64) -> Self {
        self.default_duration_minutes = minutes;
        self
    }

    /// Process the note at `path`. A missing note is skipped, not an error.
    pub async fn process_file(&self, path: &Path, date: NaiveDate, replace: bool) -> Result<RunReport> {
        match read_note(path)? {
            Some(content) => self.process_content(&content, date, replace).await,
            None => {
                info!("No markdown file at {}, skipping {}", path.display(), date);
                Ok(RunReport::default())
            }
        }
    }

    pub async fn process_content(&self, content: &str, date: NaiveDate, replace: bool) -> Result<RunReport> {
        ensure!(
            (1..=MAX_DURATION_MINUTES).contains(&self.default_duration_minutes),
            "Default duration of {} minutes is out of range",
            self.default_duration_minutes
        );
        let mut report = RunReport { note_found: true, ..Default::default() };
        debug!("Content extracted: {}", content);

        let extractor =
            ActionItemExtractor::new(self.model).with_default_duration(self.default_duration_minutes);
        report.action_items = extractor.extract_action_items(content).await?;
        debug!("Action items extracted: {:?}", report.action_items);
        info!("Found {} time-sensitive action items for {}", report.action_items.len(), date);

        let duration = Duration::minutes(self.default_duration_minutes);
        for item in &report.action_items {
            match to_calendar_event_with_duration(item, date, self.timezone, duration) {
                Ok(event) => report.events.push(event),
                Err(e) => warn!("Skipping '{}': {}", item.summary, e),
            }
        }

        let Some(calendar) = self.calendar else {
            return Ok(report);
        };

        if replace {
            report.deleted = calendar.delete_all_events_for_day(date, self.timezone).await?;
        }

        for event in &report.events {
            let receipt = calendar
                .create_event(event)
                .await
                .with_context(|| format!("Failed to create event '{}'", event.summary))?;
            report.receipts.push(receipt);
        }

        Ok(report)
    }
}

/// Executes CLI commands against a loaded configuration
pub struct Application {
    config: Config,
    config_path: Option<PathBuf>,
}

impl Application {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        Self { config, config_path }
    }

    pub async fn execute(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Run { date, file, dry_run, replace, notify: send_notification } => {
                let date = date.resolve();
                let result = self.run(date, file.as_deref(), dry_run, replace).await;
                if send_notification {
                    notify_outcome(&result);
                }
                result.map(|_| ())
            }
            Commands::Extract { file } => self.extract(&file).await,
            Commands::Clear { date } => self.clear(date).await,
            Commands::Notes => self.list_notes(),
            Commands::Config { action } => self.config_command(action),
        }
    }

    async fn run(&self, date: NaiveDate, file: Option<&Path>, dry_run: bool, replace: bool) -> Result<RunReport> {
        let content = match file {
            Some(path) => read_note(path)?,
            None => MarkdownReader::new(self.config.daily_dir()).read_daily_note(date)?,
        };
        let Some(content) = content else {
            info!("Nothing to process for {}", date);
            return Ok(RunReport::default());
        };

        let model = ModelFactory::create_model(&self.config.language_model)?;
        let timezone = self.config.timezone()?;

        let client = if dry_run { None } else { Some(self.connect_calendar().await?) };
        let calendar = client.as_ref().map(|c| c as &dyn CalendarService);

        let manager = EventManager::new(model.as_ref(), calendar, timezone)
            .with_default_duration(self.config.calendar.default_duration_minutes);
        let report = manager.process_content(&content, date, replace).await?;

        if dry_run {
            for event in &report.events {
                println!("{}", serde_json::to_string_pretty(&event.to_google_event())?);
            }
        } else {
            info!("Created {} events for {}", report.receipts.len(), date);
        }
        Ok(report)
    }

    async fn extract(&self, file: &Path) -> Result<()> {
        let content = read_note(file)?.ok_or_else(|| anyhow!("{} does not exist", file.display()))?;
        let model = ModelFactory::create_model(&self.config.language_model)?;
        let items = ActionItemExtractor::new(model.as_ref())
            .with_default_duration(self.config.calendar.default_duration_minutes)
            .extract_action_items(&content)
            .await?;
        println!("{}", serde_json::to_string_pretty(&items)?);
        Ok(())
    }

    async fn clear(&self, date: DateArgs) -> Result<()> {
        let date = date.resolve();
        let calendar = self.connect_calendar().await?;
        let deleted = calendar.delete_all_events_for_day(date, self.config.timezone()?).await?;
        println!("Deleted {} events on {}", deleted, date);
        Ok(())
    }

    fn list_notes(&self) -> Result<()> {
        let reader = MarkdownReader::new(self.config.daily_dir());
        let notes = reader.list_notes()?;
        if notes.is_empty() {
            println!("No notes found in {}", reader.directory().display());
        }
        for note in notes {
            println!("  - {}", note.display());
        }
        Ok(())
    }

    fn config_command(&self, action: ConfigActions) -> Result<()> {
        match action {
            ConfigActions::Show => {
                print!("{}", toml::to_string_pretty(&self.config)?);
                println!();
                for var in KNOWN_ENV_VARS {
                    let state = if std::env::var(var).is_ok() { "set" } else { "not set" };
                    println!("# {}: {}", var, state);
                }
                Ok(())
            }
            ConfigActions::Init => {
                let path = match &self.config_path {
                    Some(path) => path.clone(),
                    None => get_config_path()?,
                };
                if path.exists() {
                    return Err(anyhow!("Config file already exists at {}", path.display()));
                }
                Config::default().save_to(&path)?;
                println!("Wrote default config to {}", path.display());
                Ok(())
            }
        }
    }

    async fn connect_calendar(&self) -> Result<GoogleCalendarClient> {
        let credentials = self
            .config
            .calendar
            .credentials_path
            .as_deref()
            .ok_or_else(|| anyhow!("No credentials configured; set GOOGLE_CREDENTIALS_PATH or calendar.credentials_path"))?;
        Ok(GoogleCalendarClient::connect(credentials, &self.config.calendar.calendar_id).await?)
    }
}

fn notify_outcome(result: &Result<RunReport>) {
    match result {
        Ok(report) if report.events_added() => {
            notify("To-Do List Processed", "Events added to Google Calendar")
        }
        Ok(_) => notify("To-Do List Processed", "No events added to Google Calendar"),
        Err(e) => notify("To-Do List Processing Failed", &e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CalendarError, RemoteEvent};
    use async_trait::async_trait;
    use chrono::DateTime;
    use chrono_tz::America::Los_Angeles;
    use std::sync::Mutex;

    struct FixedModel(&'static str);

    #[async_trait]
    impl LanguageModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct CountingCalendar {
        created: Mutex<usize>,
    }

    #[async_trait]
    impl CalendarService for CountingCalendar {
        async fn create_event(&self, _event: &CalendarEvent) -> Result<EventReceipt, CalendarError> {
            let mut created = self.created.lock().unwrap();
            *created += 1;
            Ok(EventReceipt { id: format!("evt{}", created), html_link: None })
        }

        async fn list_events(
            &self,
            _time_min: DateTime<Tz>,
            _time_max: DateTime<Tz>,
        ) -> Result<Vec<RemoteEvent>, CalendarError> {
            Ok(Vec::new())
        }

        async fn delete_event(&self, _event_id: &str) -> Result<(), CalendarError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_without_calendar_builds_events_only() -> Result<()> {
        let model = FixedModel(r#"{"action_items": [{"summary": "Pay rent", "start_time": "9 AM"}]}"#);
        let manager = EventManager::new(&model, None, Los_Angeles);
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let report = manager.process_content("- pay rent 9am", date, true).await?;

        assert!(report.note_found);
        assert_eq!(report.events.len(), 1);
        assert!(report.receipts.is_empty());
        assert!(!report.events_added());
        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_range_duration_fails_before_model_call() {
        let model = FixedModel(r#"{"action_items": [{"summary": "Pay rent", "start_time": "9 AM"}]}"#);
        let manager = EventManager::new(&model, None, Los_Angeles).with_default_duration(i64::MAX);
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        assert!(manager.process_content("- pay rent 9am", date, false).await.is_err());
    }

    #[tokio::test]
    async fn test_run_without_daily_note_is_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut config = Config::default();
        config.notes.daily_dir = dir.path().display().to_string();
        let app = Application::new(config, None);
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        // No note means no model or calendar is ever contacted
        let report = app.run(date, None, false, false).await?;
        assert!(!report.note_found);
        assert!(report.action_items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_creates_one_event_per_item() -> Result<()> {
        let model = FixedModel(
            r#"{"action_items": [{"summary": "A", "start_time": "9 AM"}, {"summary": "B", "start_time": "11 AM"}]}"#,
        );
        let calendar = CountingCalendar::default();
        let manager = EventManager::new(&model, Some(&calendar), Los_Angeles);
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let report = manager.process_content("notes", date, false).await?;

        assert_eq!(*calendar.created.lock().unwrap(), 2);
        assert!(report.events_added());
        Ok(())
    }
}
