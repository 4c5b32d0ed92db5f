use driveline_game::{
    DeathDraw, DriveOutcome, DriveSimulator, DriveStart, Matchup, ModelVariant, ParameterProvider,
    PerSide, PosteriorSampler, PosteriorTrace, RngBundle, Side, SimError, SimulationConfig,
    SituationalEffects, TurnoverDraw,
};

fn traces(death: f64, turnover: f64) -> (PosteriorTrace<DeathDraw>, PosteriorTrace<TurnoverDraw>) {
    (
        PosteriorTrace::single(DeathDraw {
            atts: vec![0.1, -0.1],
            defs: vec![-0.05, 0.05],
            atts_rz: None,
            defs_rz: None,
            home: Some(vec![0.03, 0.01]),
            baseline_hazards: vec![death; 3],
            situational: SituationalEffects::default(),
        }),
        PosteriorTrace::single(TurnoverDraw {
            atts: vec![0.0, 0.0],
            defs: Some(vec![0.0, 0.0]),
            home: Some(0.0),
            baseline_hazards: vec![turnover; 3],
            situational: SituationalEffects::default(),
        }),
    )
}

fn start(offense: Side, yardline: f64) -> DriveStart {
    DriveStart {
        matchup: Matchup::new(0, 1),
        offense,
        yardline,
        clock: 50.0,
        score: PerSide::new(7, 3),
        iteration: None,
    }
}

#[test]
fn drives_never_lose_yards() {
    let (d, t) = traces(0.03, 0.01);
    let mut sampler = PosteriorSampler::new(&d, &t, ModelVariant::NoRedzone, 2, 3).unwrap();
    let config = SimulationConfig::default();
    let simulator = DriveSimulator::new(&config);
    let mut rngs = RngBundle::from_user_seed(2024);
    sampler.resample(rngs.parameters());
    sampler.bind_matchup(Matchup::new(0, 1)).unwrap();

    for round in 0..500 {
        let side = if round % 2 == 0 { Side::Home } else { Side::Away };
        let yardline = f64::from(round % 99);
        let drive = simulator
            .run(&start(side, yardline), &sampler, rngs.play())
            .unwrap();
        assert!(drive.record.yards >= 0.0);
        assert!(drive.record.end_yardline >= drive.record.start_yardline);
        assert!(drive.record.end_clock <= drive.record.start_clock);
        assert!((0.0..=100.0).contains(&drive.next_yardline));
    }
}

#[test]
fn redzone_exits_are_touchdowns() {
    let (d, t) = traces(0.02, 0.01);
    let mut sampler = PosteriorSampler::new(&d, &t, ModelVariant::NoRedzone, 2, 3).unwrap();
    let config = SimulationConfig::default();
    let simulator = DriveSimulator::new(&config);
    let mut rngs = RngBundle::from_user_seed(7);
    sampler.resample(rngs.parameters());
    sampler.bind_matchup(Matchup::new(0, 1)).unwrap();

    let mut touchdowns = 0;
    for _ in 0..300 {
        let drive = simulator
            .run(&start(Side::Away, 90.0), &sampler, rngs.play())
            .unwrap();
        let reached_goal = drive.record.end_yardline >= 100.0 - 1e-9;
        assert_eq!(reached_goal, drive.outcome() == DriveOutcome::Touchdown);
        if drive.outcome() == DriveOutcome::Touchdown {
            touchdowns += 1;
            assert_eq!(drive.points, 7);
            assert!((drive.next_yardline - 20.0).abs() < f64::EPSILON);
        }
    }
    assert!(touchdowns > 0);
}

#[test]
fn turnovers_flip_the_death_position() {
    let (d, t) = traces(0.0, 0.05);
    let mut sampler = PosteriorSampler::new(&d, &t, ModelVariant::NoRedzone, 2, 3).unwrap();
    let config = SimulationConfig::default();
    let simulator = DriveSimulator::new(&config);
    let mut rngs = RngBundle::from_user_seed(99);
    sampler.resample(rngs.parameters());
    sampler.bind_matchup(Matchup::new(0, 1)).unwrap();

    let mut turnovers = 0;
    for _ in 0..200 {
        // Starting inside the final piece keeps the death position equal to
        // start + yards with no boundary nudges.
        let drive = simulator
            .run(&start(Side::Home, 76.0), &sampler, rngs.play())
            .unwrap();
        match drive.outcome() {
            DriveOutcome::Turnover => {
                turnovers += 1;
                let position = drive.record.end_yardline;
                assert!((drive.next_yardline - (100.0 - position)).abs() < 1e-9);
                assert_eq!(drive.points, 0);
            }
            DriveOutcome::Touchdown => {}
            other => panic!("only turnovers or touchdowns are possible, got {other:?}"),
        }
    }
    assert!(turnovers > 0);
}

#[test]
fn drives_need_a_prepared_provider() {
    let (d, t) = traces(0.02, 0.01);
    let config = SimulationConfig::default();
    let simulator = DriveSimulator::new(&config);
    let mut rngs = RngBundle::from_user_seed(1);
    let mut sampler = PosteriorSampler::new(&d, &t, ModelVariant::NoRedzone, 2, 3).unwrap();
    assert_eq!(
        simulator.run(&start(Side::Home, 20.0), &sampler, rngs.play()),
        Err(SimError::Uninitialized)
    );
    sampler.resample(rngs.parameters());
    assert_eq!(
        simulator.run(&start(Side::Home, 20.0), &sampler, rngs.play()),
        Err(SimError::Unbound)
    );
    sampler.bind_matchup(Matchup::new(0, 1)).unwrap();
    assert_eq!(
        simulator.run(&start(Side::Home, 101.0), &sampler, rngs.play()),
        Err(SimError::OutOfRange { yardline: 101.0 })
    );
}
