//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements   | Connects to                         |
//! |------------|--------------|-------------------------------------|
//! | `gpio`     | BusPort      | any embedded-hal open-drain pin     |
//! | `log_sink` | EventSink    | Serial log output                   |
//! | `time`     | TickSource   | ESP32 system timer / host `Instant` |
//! | `sim`      | BusPort      | simulated sensor waveform (host)    |
//! |            | TickSource   | simulated tick counter (host)       |

pub mod gpio;
pub mod log_sink;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod time;
