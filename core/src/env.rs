use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

use serde::Deserialize;

/// Host variables the harness consults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostEnv {
    pub path: Option<String>,
    pub home: Option<PathBuf>,
    pub runner_temp: Option<PathBuf>,
}

impl HostEnv {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_iter(unicode_vars(std::env::vars_os()))
    }

    /// Root under which transient harness files are placed.
    pub fn temp_root(&self) -> &Path {
        self.runner_temp
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new(BaseEnv::FALLBACK_TEMP_ROOT))
    }
}

/// Drops variables whose name or value is not valid Unicode.
///
/// `std::env::vars` panics on those; callers that feed `envy` go through here.
pub fn unicode_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
}

/// The immutable environment every executed command starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseEnv {
    vars: BTreeMap<String, String>,
}

impl BaseEnv {
    pub const FALLBACK_TEMP_ROOT: &str = "/tmp";
    const FALLBACK_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

    pub fn new(host: &HostEnv, extra: &BTreeMap<String, String>) -> Self {
        let home = host
            .home
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from(Self::FALLBACK_TEMP_ROOT));

        let mut vars = BTreeMap::new();
        vars.insert(
            "PATH".to_owned(),
            host.path.clone().unwrap_or_else(|| Self::FALLBACK_PATH.to_owned()),
        );
        vars.insert("HOME".to_owned(), home.to_string_lossy().into_owned());
        vars.insert("FORCE_COLOR".to_owned(), "true".to_owned());
        vars.insert("DOTNET_CLI_HOME".to_owned(), "/tmp".to_owned());
        vars.insert("DOTNET_NOLOGO".to_owned(), "true".to_owned());
        vars.extend(extra.iter().map(|(k, v)| (k.to_owned(), v.to_owned())));
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::btreemap;

    fn host(vars: &[(&str, &str)]) -> HostEnv {
        envy::from_iter(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
        .unwrap()
    }

    #[test]
    fn host_env_is_read_case_insensitively() {
        let h = host(&[("PATH", "/opt/bin"), ("RUNNER_TEMP", "/runner/tmp")]);
        assert_eq!(h.path.as_deref(), Some("/opt/bin"));
        assert_eq!(h.temp_root(), Path::new("/runner/tmp"));
    }

    #[test]
    fn non_unicode_host_vars_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("PATH"), OsString::from("/opt/bin")),
            (OsString::from("HOME"), OsString::from_vec(b"/home/caf\xe9".to_vec())),
            (OsString::from_vec(b"X\xff".to_vec()), OsString::from("1")),
        ];
        let h: HostEnv = envy::from_iter(unicode_vars(vars)).unwrap();
        assert_eq!(h.path.as_deref(), Some("/opt/bin"));
        assert_eq!(h.home, None);
    }

    #[test]
    fn temp_root_falls_back_to_tmp() {
        assert_eq!(HostEnv::default().temp_root(), Path::new("/tmp"));
        assert_eq!(host(&[("RUNNER_TEMP", "")]).temp_root(), Path::new("/tmp"));
    }

    #[test]
    fn baseline_contains_fixed_defaults() {
        let h = host(&[("PATH", "/opt/bin"), ("HOME", "/home/grader")]);
        let env = BaseEnv::new(&h, &BTreeMap::new());
        assert_eq!(env.get("PATH"), Some("/opt/bin"));
        assert_eq!(env.get("HOME"), Some("/home/grader"));
        assert_eq!(env.get("FORCE_COLOR"), Some("true"));
        assert_eq!(env.get("DOTNET_NOLOGO"), Some("true"));
        assert_eq!(env.get("DOTNET_CLI_HOME"), Some("/tmp"));
    }

    #[test]
    fn extra_vars_override_defaults() {
        let extra = btreemap! {
            "FORCE_COLOR".to_owned() => "false".to_owned(),
            "LANG".to_owned() => "C.UTF-8".to_owned(),
        };
        let env = BaseEnv::new(&HostEnv::default(), &extra);
        assert_eq!(env.get("FORCE_COLOR"), Some("false"));
        assert_eq!(env.get("LANG"), Some("C.UTF-8"));
        assert_eq!(env.get("PATH"), Some("/usr/local/bin:/usr/bin:/bin"));
    }
}
