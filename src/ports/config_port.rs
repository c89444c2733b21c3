//! Configuration access port trait.

/// Typed lookups over `[section] key = value` configuration.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    fn has_key(&self, section: &str, key: &str) -> bool {
        self.get_string(section, key).is_some()
    }
}

impl<T: ConfigPort + ?Sized> ConfigPort for &T {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        (**self).get_string(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        (**self).get_int(section, key, default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        (**self).get_double(section, key, default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        (**self).get_bool(section, key, default)
    }
}
