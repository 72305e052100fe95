use std::thread;
use std::time::Duration;

pub fn wait_n_ms(n: u64) {
    thread::sleep(Duration::from_millis(n));
}
