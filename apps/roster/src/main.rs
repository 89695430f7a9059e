use std::{io::Write, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, ConfirmPrompt, DeletePrompt, HttpStudentStore, PreConfirmed, RemoveOutcome,
    RosterController, StudentForm,
};
use shared::{dates::to_display_form, domain::StudentId, protocol::Student};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Manage the student roster")]
struct Args {
    /// Roster service host. Overrides roster.toml and ROSTER_HOST.
    #[arg(long)]
    host: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every student.
    List,
    /// Create a student.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        /// DD/MM/YYYY
        #[arg(long)]
        birth_date: String,
    },
    /// Edit a student; omitted fields keep their current value.
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
        /// DD/MM/YYYY
        #[arg(long)]
        birth_date: Option<String>,
    },
    /// Delete a student after confirmation.
    Remove {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

struct StdinPrompt;

#[async_trait]
impl ConfirmPrompt for StdinPrompt {
    async fn confirm(&self, prompt: &DeletePrompt) -> bool {
        let who = match &prompt.student {
            Some(student) => format!("{} ({})", student.name, student.id),
            None => format!("student {}", prompt.student_id),
        };
        let question = format!(
            "{}: {} {who}\n[{}/{}] ",
            prompt.title,
            prompt.message,
            prompt.cancel_label.to_ascii_lowercase(),
            prompt.confirm_label.to_ascii_lowercase(),
        );
        let confirm_label = prompt.confirm_label.to_ascii_lowercase();

        let answer = tokio::task::spawn_blocking(move || {
            print!("{question}");
            let _ = std::io::stdout().flush();
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => {
                let line = line.trim().to_ascii_lowercase();
                line == confirm_label || line == "y" || line == "yes"
            }
            _ => false,
        }
    }
}

fn print_roster(students: &[Student]) {
    if students.is_empty() {
        println!("No students.");
        return;
    }
    for student in students {
        let born = to_display_form(&student.birth_date);
        let born = if born.is_empty() { "-".to_string() } else { born };
        println!(
            "{}\t{}\t{} years\tborn {}",
            student.id, student.name, student.age, born
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    info!(host = %settings.host, "using roster service");
    let store = HttpStudentStore::from_settings(&settings)
        .with_context(|| format!("invalid roster service host '{}'", settings.host))?;
    let controller = RosterController::new(Arc::new(store));
    run(&controller, args.command, &StdinPrompt).await
}

// A failed initial load only blocks `list`; the other commands still reach
// the service on their own.
async fn run(
    controller: &RosterController,
    command: Command,
    confirm: &dyn ConfirmPrompt,
) -> Result<()> {
    if let Err(err) = controller.start().await {
        if matches!(command, Command::List) {
            return Err(err).context("failed to load the roster");
        }
        warn!(%err, "roster could not be loaded; continuing");
    }

    match command {
        Command::List => {}
        Command::Add {
            name,
            age,
            birth_date,
        } => {
            let saved = controller
                .submit(StudentForm::new(name, age, birth_date))
                .await?;
            println!("Created student {}", saved.id);
        }
        Command::Edit {
            id,
            name,
            age,
            birth_date,
        } => {
            let session = controller.start_edit(StudentId(id)).await?;
            let form = controller
                .edit_form(|form| {
                    if let Some(name) = name {
                        form.name = name;
                    }
                    if let Some(age) = age {
                        form.age = age;
                    }
                    if let Some(birth_date) = birth_date {
                        form.birth_date = birth_date;
                    }
                })
                .await;
            let saved = controller.submit(form).await?;
            println!("{}: student {}", session.submit_label(), saved.id);
        }
        Command::Remove { id, yes } => {
            let prompt: &dyn ConfirmPrompt = if yes { &PreConfirmed } else { confirm };
            match controller.remove(StudentId(id), prompt).await? {
                RemoveOutcome::Deleted => println!("Deleted student {id}"),
                RemoveOutcome::Declined => println!("Kept student {id}"),
            }
        }
    }

    print_roster(&controller.roster().await);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use client_core::{RemoteStudentStore, RosterError, RosterResult};
    use shared::{dates::ServiceDate, protocol::StudentDraft};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List,
        Create(String),
        Delete(StudentId),
    }

    /// Service whose `GET /alunos` always fails while writes succeed.
    #[derive(Default)]
    struct ListFailsStore {
        calls: Mutex<Vec<Call>>,
    }

    impl ListFailsStore {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl RemoteStudentStore for ListFailsStore {
        async fn list(&self) -> RosterResult<Vec<Student>> {
            self.calls.lock().expect("calls lock").push(Call::List);
            Err(RosterError::Network("500 Internal Server Error".into()))
        }

        async fn create(&self, draft: &StudentDraft) -> RosterResult<Student> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(Call::Create(draft.name.clone()));
            Ok(Student {
                id: StudentId(1),
                name: draft.name.clone(),
                age: draft.age,
                birth_date: ServiceDate::from_parts(2012, 5, 9),
            })
        }

        async fn update(&self, id: StudentId, _draft: &StudentDraft) -> RosterResult<Student> {
            Err(RosterError::NotFound(id))
        }

        async fn delete(&self, id: StudentId) -> RosterResult<()> {
            self.calls.lock().expect("calls lock").push(Call::Delete(id));
            Ok(())
        }
    }

    struct Refuse;

    #[async_trait]
    impl ConfirmPrompt for Refuse {
        async fn confirm(&self, _prompt: &DeletePrompt) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn add_is_sent_even_when_the_roster_cannot_load() {
        let store = Arc::new(ListFailsStore::default());
        let controller = RosterController::new(store.clone());

        run(
            &controller,
            Command::Add {
                name: "Ana".into(),
                age: "12".into(),
                birth_date: "09/05/2012".into(),
            },
            &Refuse,
        )
        .await
        .expect("add succeeds");

        assert_eq!(
            store.calls(),
            vec![Call::List, Call::Create("Ana".into()), Call::List]
        );
    }

    #[tokio::test]
    async fn remove_is_sent_even_when_the_roster_cannot_load() {
        let store = Arc::new(ListFailsStore::default());
        let controller = RosterController::new(store.clone());

        run(&controller, Command::Remove { id: 4, yes: true }, &Refuse)
            .await
            .expect("remove succeeds");

        assert_eq!(
            store.calls(),
            vec![Call::List, Call::Delete(StudentId(4)), Call::List]
        );
    }

    #[tokio::test]
    async fn list_fails_when_the_roster_cannot_load() {
        let store = Arc::new(ListFailsStore::default());
        let controller = RosterController::new(store.clone());

        let err = run(&controller, Command::List, &Refuse)
            .await
            .expect_err("nothing to list");

        assert!(err.to_string().contains("failed to load the roster"));
        assert_eq!(store.calls(), vec![Call::List]);
    }
}
