//! Shared utilities for integration testing: materialize a gateway
//! configuration tree on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary gateway root directory with `conf/` and sector trees.
pub struct GatewayRoot {
    dir: TempDir,
}

impl GatewayRoot {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("conf")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn sector_dir(&self, name: &str) -> PathBuf {
        self.dir.path().join("sectors").join(name)
    }

    /// Write `conf/init.yaml` with sectorPaths pointing at the named
    /// sector directories (in the given order).
    pub fn write_init(&self, sector_names: &[&str]) {
        let mut init = String::from(
            "processTitle: gateway-test\nloadBalancer:\n  type: RoundRobin\n  maps:\n    - mode: worker\nsectorPaths:\n",
        );
        for name in sector_names {
            init.push_str(&format!("  {}: {}\n", name, self.sector_dir(name).display()));
        }
        self.write_init_raw(&init);
    }

    /// Write `conf/init.yaml` verbatim.
    pub fn write_init_raw(&self, content: &str) {
        fs::write(self.dir.path().join("conf").join("init.yaml"), content).unwrap();
    }

    /// Create a sector directory with its `sector.yaml`.
    pub fn add_sector(&self, name: &str, sector_yaml: &str) {
        let dir = self.sector_dir(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("sector.yaml"), sector_yaml).unwrap();
    }

    /// Drop a `module.<name>.yaml` document into a sector directory.
    #[allow(dead_code)]
    pub fn add_module_doc(&self, sector: &str, module: &str, content: &str) {
        fs::write(
            self.sector_dir(sector).join(format!("module.{module}.yaml")),
            content,
        )
        .unwrap();
    }
}
