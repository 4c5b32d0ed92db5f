use driveline_game::{
    BatchOptions, DeathDraw, DriveOutcome, DriveSimulator, DriveStart, FieldPartition, GameRules,
    Matchup, ModelVariant, ParameterProvider, PerSide, PosteriorSampler, PosteriorTrace,
    RngBundle, Schedule, Side, SimulationConfig, SituationalEffects, TurnoverDraw, by_piece,
    simulate_n_seasons, summarize, tabulate,
};

const SAMPLE_SIZE: usize = 5000;
const TOLERANCE: f64 = 0.025;

fn one_piece_traces(
    death: f64,
    turnover: f64,
) -> (PosteriorTrace<DeathDraw>, PosteriorTrace<TurnoverDraw>) {
    (
        PosteriorTrace::single(DeathDraw {
            atts: vec![0.0, 0.0],
            defs: vec![0.0, 0.0],
            atts_rz: None,
            defs_rz: None,
            home: None,
            baseline_hazards: vec![death],
            situational: SituationalEffects::default(),
        }),
        PosteriorTrace::single(TurnoverDraw {
            atts: vec![0.0, 0.0],
            defs: None,
            home: None,
            baseline_hazards: vec![turnover],
            situational: SituationalEffects::default(),
        }),
    )
}

fn rate(count: usize) -> f64 {
    let total = f64::from(u32::try_from(SAMPLE_SIZE).expect("sample size fits"));
    f64::from(u32::try_from(count).expect("count fits")) / total
}

#[test]
fn touchdown_rate_matches_exponential_survival() {
    let (d, t) = one_piece_traces(0.008, 0.002);
    let config = SimulationConfig {
        partition: FieldPartition::new(&[0, 100], 0).unwrap(),
        ..SimulationConfig::default()
    };
    let mut sampler = PosteriorSampler::new(&d, &t, ModelVariant::NeutralField, 2, 1).unwrap();
    let mut rngs = RngBundle::from_user_seed(0xF00D);
    sampler.resample(rngs.parameters());
    sampler.bind_matchup(Matchup::new(0, 1)).unwrap();
    let simulator = DriveSimulator::new(&config);
    let start = DriveStart {
        matchup: Matchup::new(0, 1),
        offense: Side::Home,
        yardline: 20.0,
        clock: 45.0,
        score: PerSide::default(),
        iteration: None,
    };

    let mut touchdowns = 0usize;
    let mut turnovers = 0usize;
    let mut deaths = 0usize;
    let mut drives = Vec::with_capacity(SAMPLE_SIZE);
    for _ in 0..SAMPLE_SIZE {
        let drive = simulator.run(&start, &sampler, rngs.play()).unwrap();
        match drive.outcome() {
            DriveOutcome::Touchdown => touchdowns += 1,
            DriveOutcome::Turnover => {
                turnovers += 1;
                deaths += 1;
            }
            DriveOutcome::FieldGoal | DriveOutcome::Punt => deaths += 1,
        }
        drives.push(drive.record);
    }

    let expected = (-0.01_f64 * 80.0).exp();
    let observed = rate(touchdowns);
    assert!(
        (observed - expected).abs() <= TOLERANCE,
        "touchdown rate drifted: observed {observed:.4}, expected {expected:.4}"
    );
    let share = f64::from(u32::try_from(turnovers).expect("count fits"))
        / f64::from(u32::try_from(deaths).expect("count fits"));
    assert!(
        (share - 0.2).abs() <= 2.0 * TOLERANCE,
        "turnover share drifted: observed {share:.4}"
    );

    let pieces = by_piece(&tabulate(&config.partition, &drives));
    let counts = pieces[&0];
    assert!((counts.death_rate() - 0.008).abs() <= 0.001);
    assert!((counts.turnover_rate() - 0.002).abs() <= 0.0005);
}

#[test]
fn evenly_matched_teams_split_wins() {
    let (d, t) = one_piece_traces(0.02, 0.005);
    let config = SimulationConfig {
        partition: FieldPartition::new(&[0, 100], 0).unwrap(),
        rules: GameRules {
            tie_break_home_edge: 0.0,
            ..GameRules::default()
        },
        ..SimulationConfig::default()
    };
    let sampler = PosteriorSampler::new(&d, &t, ModelVariant::NeutralField, 2, 1).unwrap();
    let schedule = Schedule::new(vec![Matchup::new(0, 1)]);
    let options = BatchOptions::new(SAMPLE_SIZE, 11);
    let output = simulate_n_seasons(&config, &schedule, &sampler, &options).unwrap();
    let summaries = summarize(&output.table);
    let home = &summaries[0];
    assert_eq!(home.iterations, SAMPLE_SIZE);
    assert!(
        (home.wins - 0.5).abs() <= TOLERANCE,
        "home win rate drifted: observed {:.4}",
        home.wins
    );
}
