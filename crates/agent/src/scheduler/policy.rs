/// Whether a check runs on `tick`.
///
/// A healthy check runs on its own interval grid. A failing check is retried
/// every `retry_interval` ticks, counted from the point where the current
/// failure streak began, realigned to the interval grid.
pub fn should_run(interval: u64, retry_interval: u64, failures: u32, tick: u64) -> bool {
    let interval = interval.max(1) as i64;
    let tick = tick as i64;

    if failures == 0 {
        return tick.rem_euclid(interval) == 0;
    }

    let retry_interval = retry_interval.max(1) as i64;
    if retry_interval == 1 {
        return true;
    }

    let minutes_failed = (failures as i64 - 1) * retry_interval;
    let minute_failed = (tick - minutes_failed - 1).div_euclid(interval) * interval;
    let last_fail = minute_failed + minutes_failed;
    tick - last_fail >= retry_interval
}
