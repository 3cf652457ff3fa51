pub(crate) mod sink;

mod registry;
pub(crate) use self::registry::Registry;
