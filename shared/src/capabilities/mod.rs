mod dispatch;
mod kv;

pub use self::dispatch::{
    Dispatch, DispatchError, DispatchOperation, DispatchReceipt, DispatchResult, PendingAction,
};
pub use self::kv::{
    decode_value, encode_value, flag_is_set, KeyNamespace, KvError, KvKey,
};

pub use crux_core::render::Render;
pub use crux_kv::KeyValue;

use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub kv: KeyValue<Event>,
    pub dispatch: Dispatch<Event>,
}
