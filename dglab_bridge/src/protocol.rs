pub use dglab_protocol::{
    Channel, DeviceEvent, FeedbackButton, PulseOperation, StrengthData, StrengthOperation,
    TonMessage,
};
