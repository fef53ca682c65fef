use crate::model::error::NotifyError;
use crate::model::PushMessage;

pub trait PushSender: Send + Sync + 'static {
    fn send(&self, message: &PushMessage) -> impl Future<Output = Result<(), NotifyError>> + Send;
}
