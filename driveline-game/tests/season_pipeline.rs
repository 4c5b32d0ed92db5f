use driveline_game::{
    BatchOptions, DeathDraw, DriveOutcome, ModelVariant, PosteriorSampler, PosteriorTrace,
    Schedule, Side, SimulationConfig, SlugMatchup, TeamTable, TurnoverDraw, drive_fingerprint,
    simulate_n_seasons, summarize,
};

const DEATH_TRACE: &str = r#"{"draws": [{
    "atts": [0.12, -0.12], "defs": [-0.04, 0.04],
    "atts_rz": [0.2, -0.1], "defs_rz": [0.05, -0.05],
    "home": [0.03, 0.02],
    "baseline_hazards": [0.018, 0.022, 0.035],
    "two_minute_drill": -0.3, "offense_losing_badly": -0.1, "offense_winning_greatly": 0.2
}]}"#;

const TURNOVER_TRACE: &str = r#"{"draws": [{
    "atts": [0.05, -0.05], "defs": [0.1, -0.1], "home": 0.04,
    "baseline_hazards": [0.006, 0.005, 0.007],
    "two_minute_drill": 0.25
}]}"#;

const TEAMS: &str = r#"["SEA", "ARI"]"#;
const SCHEDULE: &str = r#"[{"home": "SEA", "away": "ARI"}, {"home": "ARI", "away": "SEA"}]"#;

struct Inputs {
    death: PosteriorTrace<DeathDraw>,
    turnover: PosteriorTrace<TurnoverDraw>,
    teams: TeamTable,
    schedule: Schedule,
}

fn inputs() -> Inputs {
    let teams: TeamTable = serde_json::from_str(TEAMS).unwrap();
    let entries: Vec<SlugMatchup> = serde_json::from_str(SCHEDULE).unwrap();
    let schedule = Schedule::from_slugs(&teams, &entries).unwrap();
    Inputs {
        death: PosteriorTrace::from_json(DEATH_TRACE).unwrap(),
        turnover: PosteriorTrace::from_json(TURNOVER_TRACE).unwrap(),
        teams,
        schedule,
    }
}

#[test]
fn single_iteration_tables_balance() {
    let inputs = inputs();
    let config = SimulationConfig::default();
    let sampler = PosteriorSampler::new(
        &inputs.death,
        &inputs.turnover,
        ModelVariant::Baseline,
        inputs.teams.len(),
        config.partition.pieces(),
    )
    .unwrap();
    let options = BatchOptions::new(1, 42).with_drives(true);
    let output = simulate_n_seasons(&config, &inputs.schedule, &sampler, &options).unwrap();

    assert_eq!(output.table.len(), 2);
    for row in output.table.rows() {
        let total = row.total();
        let played = u32::try_from(inputs.schedule.games_for(row.team)).unwrap();
        assert_eq!(total.wins + total.losses, played);
        assert_eq!(total.games, played);
    }

    // Home points in the table equal the scoring drives of the home side.
    let home_points: u32 = output.table.rows().iter().map(|r| r.home.points).sum();
    let scored: u32 = output
        .drives
        .iter()
        .filter(|d| d.offense == Side::Home)
        .map(|d| match d.outcome {
            DriveOutcome::Touchdown => 7,
            DriveOutcome::FieldGoal => 3,
            DriveOutcome::Punt | DriveOutcome::Turnover => 0,
        })
        .sum();
    assert_eq!(home_points, scored);

    let wins: u32 = output.table.rows().iter().map(|r| r.total().wins).sum();
    assert_eq!(wins as usize, inputs.schedule.len());
}

#[test]
fn same_seed_reproduces_drive_logs() {
    let inputs = inputs();
    let config = SimulationConfig::default();
    let sampler = PosteriorSampler::new(
        &inputs.death,
        &inputs.turnover,
        ModelVariant::Baseline,
        inputs.teams.len(),
        config.partition.pieces(),
    )
    .unwrap();
    let options = BatchOptions::new(3, 0xD21E).with_drives(true);

    let first = simulate_n_seasons(&config, &inputs.schedule, &sampler, &options).unwrap();
    let second = simulate_n_seasons(&config, &inputs.schedule, &sampler, &options).unwrap();
    assert!(!first.drives.is_empty());
    assert_eq!(
        drive_fingerprint(&first.drives).unwrap(),
        drive_fingerprint(&second.drives).unwrap()
    );
    assert_eq!(first.table, second.table);

    let other = BatchOptions {
        seed: 0xD21F,
        ..options
    };
    let third = simulate_n_seasons(&config, &inputs.schedule, &sampler, &other).unwrap();
    assert_ne!(
        drive_fingerprint(&first.drives).unwrap(),
        drive_fingerprint(&third.drives).unwrap()
    );
}

#[test]
fn summaries_cover_every_scheduled_team() {
    let inputs = inputs();
    let config = SimulationConfig::default();
    let sampler = PosteriorSampler::new(
        &inputs.death,
        &inputs.turnover,
        ModelVariant::NeutralField,
        inputs.teams.len(),
        config.partition.pieces(),
    )
    .unwrap();
    let output =
        simulate_n_seasons(&config, &inputs.schedule, &sampler, &BatchOptions::new(25, 3)).unwrap();
    let summaries = summarize(&output.table);
    assert_eq!(summaries.len(), 2);
    for summary in &summaries {
        assert_eq!(summary.iterations, 25);
        assert!((summary.games - 2.0).abs() < 1e-12);
        assert!(summary.wins_p10 <= summary.wins_p50 && summary.wins_p50 <= summary.wins_p90);
        assert!(inputs.teams.slug(summary.team).is_some());
    }
    let total_wins: f64 = summaries.iter().map(|s| s.wins).sum();
    assert!((total_wins - 2.0).abs() < 1e-9);
}
