use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use survey_segments::render::render_report;
use survey_segments::{
    Config, Field, Outcome, PLACEHOLDER, ScratchNote, SegmentFinder, SegmentModel, Selections,
    WAITING_PROMPT,
};

/// Find the group of survey respondents you are closest to.
#[derive(Debug, Parser)]
#[command(name = "survey-segments", version)]
struct Args {
    /// TOML file overriding the default data locations.
    #[arg(short, long, env = "SURVEY_SEGMENTS_CONFIG")]
    config: Option<PathBuf>,
    /// Reference population file.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Segment names and descriptions (JSON).
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Trained segment model (.json or .msgpack).
    #[arg(long)]
    model: Option<PathBuf>,
    /// Persist population labels here between runs.
    #[arg(long)]
    label_cache: Option<PathBuf>,

    #[arg(long)]
    age: Option<String>,
    #[arg(long)]
    edu_level: Option<String>,
    #[arg(long)]
    fav_animals: Option<String>,
    #[arg(long)]
    fav_place: Option<String>,
    #[arg(long)]
    gender: Option<String>,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(p) = &self.data {
            config.data_path = p.clone();
        }
        if let Some(p) = &self.catalog {
            config.catalog_path = p.clone();
        }
        if let Some(p) = &self.model {
            config.model_path = p.clone();
        }
        if let Some(p) = &self.label_cache {
            config.label_cache = Some(p.clone());
        }
        Ok(config)
    }

    fn answers(&self) -> [(Field, Option<&str>); 5] {
        [
            (Field::Age, self.age.as_deref()),
            (Field::EduLevel, self.edu_level.as_deref()),
            (Field::FavAnimals, self.fav_animals.as_deref()),
            (Field::FavPlace, self.fav_place.as_deref()),
            (Field::Gender, self.gender.as_deref()),
        ]
    }

    /// Answers given as flags, or `None` when no answer flag was passed (interactive mode).
    /// Partial answers are kept so the caller shows the waiting prompt.
    fn one_shot_selections(&self) -> Result<Option<Selections>> {
        let answers = self.answers();
        if answers.iter().all(|(_, value)| value.is_none()) {
            return Ok(None);
        }
        let mut selections = Selections::default();
        for (field, value) in answers {
            if let Some(value) = value {
                selections.set(field, value)?;
            }
        }
        Ok(Some(selections))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.config()?;

    println!("📦 Loading model and reference data...");
    let finder = SegmentFinder::from_config(&config).context("loading segment data")?;

    match args.one_shot_selections()? {
        Some(selections) => show(&finder, &selections),
        None => interactive(&finder),
    }
}

fn show<M: SegmentModel>(finder: &SegmentFinder<M>, selections: &Selections) -> Result<()> {
    match finder.evaluate(selections)? {
        Outcome::Report(report) => print!("{}", render_report(&report)),
        Outcome::Waiting => {
            println!("{WAITING_PROMPT}");
            let missing: Vec<&str> = selections.missing().iter().map(|f| f.label()).collect();
            println!("Brakuje: {}", missing.join(", "));
        }
    }
    Ok(())
}

fn interactive<M: SegmentModel>(finder: &SegmentFinder<M>) -> Result<()> {
    println!("Powiedz nam coś o sobie");
    println!("Pomożemy Ci znaleźć osoby, które mają podobne zainteresowania");
    println!("(type 'note' to edit your notepad, 'exit' to quit)");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut note = ScratchNote::default();

    loop {
        let mut selections = Selections::default();

        for field in Field::ALL {
            loop {
                println!();
                println!("{}:", field.label());
                println!("  0) {PLACEHOLDER}");
                for (i, option) in field.options().iter().enumerate() {
                    println!("  {}) {option}", i + 1);
                }
                print!("> ");
                io::stdout().flush()?;

                let Some(line) = lines.next().transpose()? else {
                    return Ok(());
                };
                let line = line.trim();

                if line.eq_ignore_ascii_case("exit") {
                    return Ok(());
                }
                if line.eq_ignore_ascii_case("note") {
                    edit_note(&mut lines, &mut note)?;
                    continue;
                }

                let result = match line.parse::<usize>() {
                    Ok(index) => selections.choose(field, index),
                    Err(_) => selections.set(field, line),
                };
                match result {
                    Ok(()) => break,
                    Err(e) => println!("⚠️  {e}"),
                }
            }
        }

        println!();
        show(finder, &selections)?;
    }
}

fn edit_note<B: BufRead>(lines: &mut io::Lines<B>, note: &mut ScratchNote) -> Result<()> {
    println!("📝 Notatnik (notatki nie zostaną zapisane po zamknięciu)");
    if !note.is_empty() {
        println!("{}", note.text());
    }
    print!("new note> ");
    io::stdout().flush()?;

    if let Some(line) = lines.next().transpose()? {
        if note.set(line.trim()) {
            println!(
                "Note cut to {} characters.",
                ScratchNote::MAX_CHARS
            );
        }
    }
    Ok(())
}
