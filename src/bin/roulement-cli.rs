#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use roulement::{
    io,
    model::{DayType, GroupId, Holiday, HolidayId},
    planner::{FairnessReport, FairnessSubject, Planner},
    repository::MemoryStore,
    scheduler::{detect_conflicts, ConflictKind, ScheduleConfig},
    storage::{JsonStorage, Storage},
    DayProfiler, Period,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de répartition équitable des permanences
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du jeu de données
    #[arg(long, global = true, default_value = "roulement.json")]
    data: String,

    #[command(subcommand)]
    cmd: Commands,
}

/// Options de génération communes
#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// Fichier JSON de configuration (poids, écart, longueur des ponts)
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    min_gap_days: Option<u32>,
    /// Surcharge de poids, ex. `weekend=1.8` (répétable)
    #[arg(long = "weight", value_name = "TYPE=POIDS")]
    weights: Vec<String>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<ScheduleConfig> {
        let mut config = match &self.config {
            Some(path) => ScheduleConfig::from_json_file(path)?,
            None => ScheduleConfig::default(),
        };
        if let Some(gap) = self.min_gap_days {
            config.min_gap_days = gap;
        }
        for raw in &self.weights {
            let Some((kind, weight)) = raw.split_once('=') else {
                bail!("invalid weight override: {raw} (expected TYPE=WEIGHT)");
            };
            let kind: DayType = kind.parse()?;
            config.weight_overrides.insert(kind, weight.trim().parse()?);
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter un férié (un jour ou un intervalle)
    AddHoliday {
        /// AAAA-MM-JJ
        #[arg(long)]
        start: NaiveDate,
        /// AAAA-MM-JJ (inclus)
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        name: Option<String>,
    },

    /// Importer des fériés depuis un CSV
    ImportHolidays {
        #[arg(long)]
        csv: String,
    },

    /// Importer des personnes (et leurs groupes) depuis un CSV
    ImportPeople {
        #[arg(long)]
        csv: String,
    },

    /// Lister les fériés d'une année (avec leurs identifiants)
    ListHolidays {
        #[arg(long)]
        year: i32,
    },

    /// Modifier les dates ou le nom d'un férié
    UpdateHoliday {
        #[arg(long)]
        id: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        name: Option<String>,
    },

    /// Supprimer un férié
    DeleteHoliday {
        #[arg(long)]
        id: String,
    },

    /// Créer un groupe vide
    AddGroup {
        #[arg(long)]
        id: String,
    },

    /// Lister les groupes et leurs membres
    Groups,

    /// Retirer une personne d'un groupe
    RemoveMember {
        #[arg(long)]
        group: String,
        #[arg(long)]
        person: String,
    },

    /// Supprimer un groupe (l'historique est conservé)
    DeleteGroup {
        #[arg(long)]
        id: String,
    },

    /// Afficher le type et le poids de chaque jour d'un mois
    Days {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Générer le planning d'un mois
    Generate {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[command(flatten)]
        config: ConfigArgs,
        /// Calculer sans historiser
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Afficher le planning engagé d'un mois
    Schedule {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },

    /// Afficher les permanences d'une personne
    PersonSchedule {
        #[arg(long)]
        person: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, requires = "year")]
        month: Option<u32>,
    },

    /// Indicateurs d'équité d'une personne ou d'un groupe
    Fairness {
        #[arg(long)]
        year: i32,
        #[arg(long, conflicts_with = "group", required_unless_present = "group")]
        person: Option<String>,
        #[arg(long)]
        group: Option<String>,
    },

    /// Revérifier les contraintes dures de l'historique
    Check,

    /// Effacer tout l'historique des assignations
    ResetHistory {
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.data)?;
    let mut dataset = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::AddHoliday { start, end, name } => {
            dataset.holidays.push(Holiday::new(start, end, name)?);
            storage.save(&dataset)?;
            0
        }
        Commands::ImportHolidays { csv } => {
            let holidays = io::import_holidays_csv(csv)?;
            println!("{} holiday(s) imported", holidays.len());
            dataset.holidays.extend(holidays);
            storage.save(&dataset)?;
            0
        }
        Commands::ImportPeople { csv } => {
            let rows = io::import_people_csv(csv)?;
            println!("{} person(s) imported", rows.len());
            for row in rows {
                dataset.upsert_person(row.person, &row.groups);
            }
            storage.save(&dataset)?;
            0
        }
        Commands::ListHolidays { year } => {
            for h in dataset.holidays_in_year(year) {
                println!(
                    "{} | {} | {} | {}",
                    h.id(),
                    h.start_date(),
                    h.end_date(),
                    h.name().unwrap_or("-")
                );
            }
            0
        }
        Commands::UpdateHoliday {
            id,
            start,
            end,
            name,
        } => {
            if !dataset.update_holiday(&HolidayId::new(&id), start, end, name)? {
                bail!("unknown holiday: {id}");
            }
            storage.save(&dataset)?;
            0
        }
        Commands::DeleteHoliday { id } => {
            if !dataset.delete_holiday(&HolidayId::new(&id)) {
                bail!("unknown holiday: {id}");
            }
            storage.save(&dataset)?;
            0
        }
        Commands::AddGroup { id } => {
            if !dataset.add_group(&GroupId::new(&id)) {
                bail!("group already exists: {id}");
            }
            storage.save(&dataset)?;
            0
        }
        Commands::Groups => {
            for g in &dataset.groups {
                if g.members.is_empty() {
                    println!("{}: (empty)", g.id);
                } else {
                    println!("{}: {}", g.id, g.members.join(", "));
                }
            }
            0
        }
        Commands::RemoveMember { group, person } => {
            if !dataset.remove_member(&GroupId::new(&group), &person)? {
                bail!("{person} is not a member of {group}");
            }
            storage.save(&dataset)?;
            0
        }
        Commands::DeleteGroup { id } => {
            if !dataset.delete_group(&GroupId::new(&id)) {
                bail!("unknown group: {id}");
            }
            storage.save(&dataset)?;
            0
        }
        Commands::Days {
            year,
            month,
            config,
        } => {
            let config = config.resolve()?;
            let period = Period::new(year, month)?;
            let profiler = DayProfiler::new(
                &dataset.holidays,
                config.weight_table()?,
                config.long_weekend_min_length,
            );
            for p in profiler.profiles(period.range()?) {
                println!("{} | {} | {:.1}", p.date, p.day_type, p.weight);
            }
            0
        }
        Commands::Generate {
            year,
            month,
            config,
            dry_run,
            out_csv,
            out_json,
        } => {
            let config = config.resolve()?;
            let planner = Planner::new(MemoryStore::from_dataset(dataset)?);
            let outcome = if dry_run {
                planner.plan(year, month, &config)?
            } else {
                planner.generate_schedule(year, month, &config)?
            };
            if !dry_run {
                storage.save(&planner.store().to_dataset())?;
            }
            if let Some(path) = out_csv {
                io::export_records_csv(path, &outcome.records)?;
            }
            if let Some(path) = out_json {
                io::export_outcome_json(path, &outcome)?;
            }
            for r in &outcome.records {
                println!("{} | {} | {} | {}", r.date, r.group_id, r.person, r.day_type);
            }
            for w in &outcome.warnings {
                eprintln!("warning: {w}");
            }
            // Code 2 = WARNING/INCOMPLETE
            if outcome.is_complete() {
                0
            } else {
                eprintln!("{} slot(s) left unassigned", outcome.unresolved.len());
                2
            }
        }
        Commands::Schedule { year, month } => {
            let period = Period::new(year, month)?;
            let records = dataset.schedule_of(period.year, period.month);
            if records.is_empty() {
                eprintln!("no assignment for {period}");
            }
            for r in records {
                println!("{} | {} | {} | {}", r.date, r.group_id, r.person, r.day_type);
            }
            0
        }
        Commands::PersonSchedule {
            person,
            year,
            month,
        } => {
            if dataset.find_person(&person).is_none() {
                bail!("unknown person: {person}");
            }
            if let Some(month) = month {
                Period::new(year.unwrap_or_default(), month)?;
            }
            for r in dataset.person_schedule(&person, year, month) {
                println!("{} | {} | {}", r.date, r.group_id, r.day_type);
            }
            0
        }
        Commands::Fairness {
            year,
            person,
            group,
        } => {
            let subject = match (person, group) {
                (Some(name), _) => FairnessSubject::Person(name),
                (None, Some(id)) => FairnessSubject::Group(GroupId::new(id)),
                (None, None) => bail!("--person or --group is required"),
            };
            let planner = Planner::new(MemoryStore::from_dataset(dataset)?);
            let report = planner.fairness_metrics(&subject, year)?;
            if let FairnessReport::Group(metrics) = &report {
                eprintln!(
                    "group {}: std dev {:.2}, max weighted diff {:.2}",
                    metrics.group_id, metrics.weighted_std_dev, metrics.max_weighted_diff
                );
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
            0
        }
        Commands::Check => {
            // sur les lignes brutes : le registre refuserait de les charger
            let conflicts = detect_conflicts(&dataset.history);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    let kind = match c.kind {
                        ConflictKind::DoubleBooking => "double",
                        ConflictKind::ConsecutiveDays => "consecutive",
                    };
                    eprintln!("{kind}: {c}");
                }
                2
            }
        }
        Commands::ResetHistory { yes } => {
            if !yes {
                bail!("refusing to erase history without --yes");
            }
            // sans passer par le registre : l'historique peut être incohérent
            let removed = dataset.history.len();
            dataset.history.clear();
            storage.save(&dataset)?;
            println!("{removed} assignment(s) removed");
            0
        }
    };

    std::process::exit(code);
}
