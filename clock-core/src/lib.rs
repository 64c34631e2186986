#![no_std]

//! Clock-radio core: shared state, LED mode gating, the alarm tone
//! synthesizer and the light pipeline that ties sampling, spectrum analysis
//! and rendering together.

pub mod alarm;
pub mod config;
pub mod context;
pub mod mode;
pub mod panel;
pub mod pipeline;
pub mod radio;
pub mod speaker;

pub use alarm::{Alarm, AlarmState, PatternStep, PeriodicTimer, TonePwm, PATTERNS};
pub use context::ClockContext;
pub use mode::LedMode;
pub use pipeline::LightPipeline;
pub use radio::{RadioError, RadioOutputStage, Rda5807Output};
pub use speaker::GatedPwm;
