use embedded_time::duration::{Extensions, Microseconds};
use embedded_time::timer::param::{OneShot, Running};
use embedded_time::{Clock, Timer};

#[derive(Debug, PartialEq)]
pub enum TimeoutError {
    TimerStartFailed,
    TimerError,
}

/// Optional deadline. Never expires if no clock or a zero duration is configured.
#[derive(Debug)]
pub struct Timeout<'a, C: Clock> {
    timer: Option<Timer<'a, OneShot, Running, C, Microseconds>>,
}

impl<'a, C: Clock> Timeout<'a, C> {
    pub fn new(clock: Option<&'a C>, duration: Microseconds) -> Result<Timeout<'a, C>, TimeoutError> {
        let clock = match clock {
            Some(clock) if duration != 0.microseconds() => clock,
            _ => return Ok(Self { timer: None }),
        };

        let timer = clock.new_timer(duration).start().map_err(|_| TimeoutError::TimerStartFailed)?;
        Ok(Self { timer: Some(timer) })
    }

    pub fn expired(&self) -> Result<bool, TimeoutError> {
        match &self.timer {
            None => Ok(false),
            Some(timer) => timer.is_expired().map_err(|_| TimeoutError::TimerError),
        }
    }
}
