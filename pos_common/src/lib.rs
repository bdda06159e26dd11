mod money;

pub use money::{Money, MoneyConversionError, VND_CURRENCY_CODE, VND_CURRENCY_CODE_LOWER};
