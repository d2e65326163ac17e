use super::*;

#[test]
fn simulated_clock_reports_one_frame_per_tick() {
    let mut clock = SimulatedClock::new(Duration::from_millis(100));
    for _ in 0..5 {
        assert_eq!(clock.tick(), Duration::from_millis(100));
    }
    assert_eq!(clock.elapsed(), Duration::from_millis(500));
}

#[test]
fn realtime_clock_waits_for_the_frame_interval() {
    let mut clock = RealtimeClock::new(Duration::from_millis(20));
    assert_eq!(clock.tick(), Duration::from_millis(20));
    let start = Instant::now();
    let elapsed = clock.tick();
    assert!(elapsed >= Duration::from_millis(20));
    assert!(start.elapsed() >= Duration::from_millis(15));
}

#[test]
fn boxed_and_borrowed_clocks_delegate() {
    let mut inner = SimulatedClock::new(Duration::from_millis(50));
    {
        let mut borrowed = &mut inner;
        assert_eq!(Clock::tick(&mut borrowed), Duration::from_millis(50));
    }
    let mut boxed: Box<dyn Clock> = Box::new(inner);
    assert_eq!(boxed.tick(), Duration::from_millis(50));
}
