pub mod obv;
