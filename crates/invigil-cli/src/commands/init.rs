//! The `invigil init` command.

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use invigil_core::model::{ManualGrade, Student};
use invigil_core::traits::ResultStore;
use invigil_store::JsonStore;

pub async fn execute() -> Result<()> {
    // Create invigil.toml
    if std::path::Path::new("invigil.toml").exists() {
        println!("invigil.toml already exists, skipping.");
    } else {
        std::fs::write("invigil.toml", SAMPLE_CONFIG)?;
        println!("Created invigil.toml");
    }

    // Create an example quiz module
    std::fs::create_dir_all("quizzes")?;
    let sample_path = std::path::Path::new("quizzes/fractions.toml");
    if sample_path.exists() {
        println!("quizzes/fractions.toml already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_QUIZ)?;
        println!("Created quizzes/fractions.toml");
    }

    // Seed the record store with a small roster and a worked example
    let store = JsonStore::open(std::path::Path::new("./invigil-data"));
    if store.path().exists() {
        println!("{} already exists, skipping.", store.path().display());
    } else {
        for student in sample_roster() {
            store.upsert_student(&student).await?;
        }
        store.append_manual_grade(&sample_grade()).await?;
        println!(
            "Seeded {} (2 students, 1 manual grade)",
            store.path().display()
        );
    }

    println!("\nNext steps:");
    println!("  1. Edit invigil.toml: set the [student] identity for this machine");
    println!("  2. Run: invigil validate --quiz quizzes/fractions.toml");
    println!("  3. Run: invigil take --quiz quizzes/fractions.toml --preview");

    Ok(())
}

fn sample_roster() -> Vec<Student> {
    vec![
        Student {
            nis: "2024-041".into(),
            name: "Siti Rahma".into(),
            classes: vec!["8A".into()],
        },
        Student {
            nis: "2024-042".into(),
            name: "Budi Santoso".into(),
            classes: vec!["8A".into()],
        },
    ]
}

fn sample_grade() -> ManualGrade {
    ManualGrade {
        id: Uuid::new_v4(),
        student_nis: "2024-041".into(),
        module_id: "math-8a".into(),
        title: "Fractions worksheet".into(),
        score: 85,
        date: Utc::now().date_naive(),
    }
}

const SAMPLE_CONFIG: &str = r#"# invigil configuration

data_dir = "./invigil-data"

# Identity stamped onto submitted results. Remove this table on
# operator machines; take then requires --name and --nis.
[student]
name = "Siti Rahma"
nis = "2024-041"
classes = ["8A"]
"#;

const SAMPLE_QUIZ: &str = r#"[module]
title = "Mathematics 8A"

[quiz]
title = "Fractions Checkpoint"
kind = "practice"
duration_minutes = 10

[[questions]]
id = "q1"
kind = "multiple_choice"
prompt = "What is 1/2 + 1/4?"
options = ["1/6", "2/6", "3/4", "6/8"]
answer = "3/4"

[[questions]]
id = "q2"
kind = "multiple_choice"
prompt = "Which fraction equals 0.25?"
options = ["1/4", "1/3", "2/5", "1/5"]
answer = "1/4"

[[questions]]
id = "q3"
kind = "mc"
prompt = "Which is larger?"
options = ["2/3", "3/5"]
answer = "2/3"

[[questions]]
id = "q4"
kind = "essay"
prompt = "Explain how to add two fractions with different denominators."
rubric = "Finds a common denominator before adding; shows one worked example."
"#;
