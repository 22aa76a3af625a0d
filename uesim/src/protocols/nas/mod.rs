pub mod build;

#[macro_export]
macro_rules! expect_nas {
    ($t:ident, $m:expr) => {
        match $m {
            ::nas::PlainNasMessage::Mm(::nas::MmMessage::$t(message)) => Ok(message),
            m => Err(::anyhow::anyhow!(
                "Expected Nas {} but got {}",
                stringify!($t),
                m.name()
            )),
        }
    };
}
