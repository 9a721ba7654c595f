use std::time::Instant;

use log::info;

/// run `f`, logging how long it took under `name`
pub fn timed<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let ret = f();
    info!("{name}: elapsed time {:.2} sec", start.elapsed().as_secs_f64());
    ret
}
