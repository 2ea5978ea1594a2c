pub mod onelake;
