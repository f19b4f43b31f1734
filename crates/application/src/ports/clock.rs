/// Wall-clock source in unix seconds, used for cache insertion and expiry.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        cachedns_domain::cache::now_secs()
    }
}
