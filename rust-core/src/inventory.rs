/// Read-only views of the data, scripts and output directories

use crate::error::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "svg"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceFile {
    pub stem: String,
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptFile {
    pub name: String,
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub is_image: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputFolder {
    pub name: String,
    pub path: PathBuf,
    pub files: Vec<OutputFile>,
}

impl OutputFolder {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Data,
    Scripts,
    Output,
    All,
}

impl ResourceKind {
    fn includes(&self, other: ResourceKind) -> bool {
        *self == ResourceKind::All || *self == other
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub data_files: Vec<ResourceFile>,
    pub scripts: Vec<ScriptFile>,
    pub output_folders: Vec<OutputFolder>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceStats {
    pub data_files: usize,
    pub scripts: usize,
    pub output_folders: usize,
    pub total_output_files: usize,
}

/// Enumerates directory contents fresh on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct ResourceInventory {
    data_dir: PathBuf,
    data_extension: String,
    scripts_dir: PathBuf,
    script_extension: String,
    output_dir: PathBuf,
}

impl ResourceInventory {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        data_extension: impl Into<String>,
        scripts_dir: impl Into<PathBuf>,
        script_extension: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            data_extension: data_extension.into(),
            scripts_dir: scripts_dir.into(),
            script_extension: script_extension.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Data files in filesystem enumeration order; empty when the directory is absent.
    pub fn list_data_files(&self) -> Vec<ResourceFile> {
        files_with_extension(&self.data_dir, &self.data_extension)
            .into_iter()
            .filter_map(|(path, size)| {
                let filename = path.file_name()?.to_str()?.to_string();
                Some(ResourceFile {
                    stem: stem_of(&filename, &self.data_extension).to_string(),
                    filename,
                    path,
                    size,
                })
            })
            .collect()
    }

    pub fn list_scripts(&self) -> Vec<ScriptFile> {
        files_with_extension(&self.scripts_dir, &self.script_extension)
            .into_iter()
            .filter_map(|(path, size)| {
                let filename = path.file_name()?.to_str()?.to_string();
                Some(ScriptFile {
                    name: stem_of(&filename, &self.script_extension).to_string(),
                    filename,
                    path,
                    size,
                })
            })
            .collect()
    }

    /// Looks a data file up by stem or by full filename.
    pub fn find_data_file(&self, name: &str) -> Option<ResourceFile> {
        self.list_data_files()
            .into_iter()
            .find(|f| f.stem == name || f.filename == name)
    }

    pub fn find_script(&self, filename: &str) -> Option<ScriptFile> {
        self.list_scripts()
            .into_iter()
            .find(|s| s.filename == filename || s.name == filename)
    }

    /// Raw text of a data file, named with or without its extension. The
    /// content is passed through untouched.
    pub fn read_data_file(&self, name: &str) -> Result<String> {
        let files = self.list_data_files();
        match files.iter().find(|f| f.stem == name || f.filename == name) {
            Some(file) => Ok(std::fs::read_to_string(&file.path)?),
            None => Err(RouterError::ResourceNotFound {
                kind: "Data file",
                name: name.to_string(),
                available: files.into_iter().map(|f| f.filename).collect(),
            }),
        }
    }

    /// Source text of a script, named with or without its extension.
    pub fn read_script(&self, name: &str) -> Result<String> {
        let scripts = self.list_scripts();
        match scripts.iter().find(|s| s.filename == name || s.name == name) {
            Some(script) => Ok(std::fs::read_to_string(&script.path)?),
            None => Err(RouterError::ResourceNotFound {
                kind: "Script",
                name: name.to_string(),
                available: scripts.into_iter().map(|s| s.filename).collect(),
            }),
        }
    }

    pub fn find_output_folder(&self, name: &str) -> Result<OutputFolder> {
        let mut folders = self.list_output_folders();
        match folders.iter().position(|f| f.name == name) {
            Some(index) => Ok(folders.swap_remove(index)),
            None => Err(RouterError::ResourceNotFound {
                kind: "Output folder",
                name: name.to_string(),
                available: folders.into_iter().map(|f| f.name).collect(),
            }),
        }
    }

    /// Output folders with their files, newest (largest timestamp name) first.
    pub fn list_output_folders(&self) -> Vec<OutputFolder> {
        let entries = match std::fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut folders: Vec<OutputFolder> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                let files = list_output_files(&path);
                Some(OutputFolder { name, path, files })
            })
            .collect();

        folders.sort_by(|a, b| b.name.cmp(&a.name));
        folders
    }

    /// Case-insensitive substring search over resource names.
    pub fn search(&self, query: &str, kind: ResourceKind) -> SearchResults {
        let needle = query.to_lowercase();
        let mut results = SearchResults {
            query: query.to_string(),
            ..Default::default()
        };

        if kind.includes(ResourceKind::Data) {
            results.data_files = self
                .list_data_files()
                .into_iter()
                .filter(|f| f.stem.to_lowercase().contains(&needle))
                .collect();
        }
        if kind.includes(ResourceKind::Scripts) {
            results.scripts = self
                .list_scripts()
                .into_iter()
                .filter(|s| s.name.to_lowercase().contains(&needle))
                .collect();
        }
        if kind.includes(ResourceKind::Output) {
            results.output_folders = self
                .list_output_folders()
                .into_iter()
                .filter(|f| f.name.to_lowercase().contains(&needle))
                .collect();
        }

        results
    }

    pub fn stats(&self) -> ResourceStats {
        let folders = self.list_output_folders();
        ResourceStats {
            data_files: self.list_data_files().len(),
            scripts: self.list_scripts().len(),
            output_folders: folders.len(),
            total_output_files: folders.iter().map(|f| f.files.len()).sum(),
        }
    }
}

fn stem_of<'a>(filename: &'a str, extension: &str) -> &'a str {
    filename
        .strip_suffix(extension)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(filename)
}

fn files_with_extension(dir: &Path, extension: &str) -> Vec<(PathBuf, u64)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Directory not readable, treating as empty");
            return Vec::new();
        }
    };

    entries
        .filter_map(|e| e.ok())
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                return None;
            }
            let metadata = entry.metadata().ok()?;
            metadata.is_file().then(|| (path, metadata.len()))
        })
        .collect()
}

fn list_output_files(folder: &Path) -> Vec<OutputFile> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    entries
        .filter_map(|e| e.ok())
        .filter_map(|entry| {
            let path = entry.path();
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let name = path.file_name()?.to_str()?.to_string();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false);
            Some(OutputFile {
                name,
                path,
                size: metadata.len(),
                is_image,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn inventory(root: &Path) -> ResourceInventory {
        ResourceInventory::new(
            root.join("las_files"),
            "las",
            root.join("scripts"),
            "py",
            root.join("output"),
        )
    }

    fn seed(root: &Path) {
        fs::create_dir_all(root.join("las_files")).unwrap();
        fs::create_dir_all(root.join("scripts")).unwrap();
        fs::write(root.join("las_files/sample_well_01.las"), "~VERSION\n").unwrap();
        fs::write(root.join("las_files/notes.txt"), "ignore me").unwrap();
        fs::write(root.join("scripts/depth_visualization.py"), "plt.plot()\n").unwrap();
    }

    #[test]
    fn test_missing_directory_yields_empty_list() {
        let dir = TempDir::new().unwrap();
        let inventory = inventory(dir.path());
        assert!(inventory.list_data_files().is_empty());
        assert!(inventory.list_scripts().is_empty());
        assert_eq!(inventory.stats(), ResourceStats::default());
    }

    #[test]
    fn test_lists_only_matching_extension() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let inventory = inventory(dir.path());

        let files = inventory.list_data_files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].stem, "sample_well_01");
        assert_eq!(files[0].filename, "sample_well_01.las");
        assert_eq!(files[0].size, 9);

        let scripts = inventory.list_scripts();
        assert_eq!(scripts[0].name, "depth_visualization");
    }

    #[test]
    fn test_find_data_file_by_stem_or_filename() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let inventory = inventory(dir.path());
        assert!(inventory.find_data_file("sample_well_01").is_some());
        assert!(inventory.find_data_file("sample_well_01.las").is_some());
        assert!(inventory.find_data_file("sample_well_02").is_none());
    }

    #[test]
    fn test_output_folders_newest_first() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("output");
        fs::create_dir_all(out.join("2024-01-01_10-00-00")).unwrap();
        fs::create_dir_all(out.join("2024-03-05_08-30-00")).unwrap();
        fs::write(out.join("2024-03-05_08-30-00/gamma.PNG"), [0u8; 4]).unwrap();
        fs::write(out.join("2024-03-05_08-30-00/run.log"), "ok").unwrap();

        let inventory = inventory(dir.path());
        let folders = inventory.list_output_folders();
        assert_eq!(folders[0].name, "2024-03-05_08-30-00");
        assert_eq!(folders[1].name, "2024-01-01_10-00-00");

        let image = folders[0].files.iter().find(|f| f.name == "gamma.PNG").unwrap();
        assert!(image.is_image);
        let log = folders[0].files.iter().find(|f| f.name == "run.log").unwrap();
        assert!(!log.is_image);

        let stats = inventory.stats();
        assert_eq!(stats.output_folders, 2);
        assert_eq!(stats.total_output_files, 2);
    }

    #[test]
    fn test_search_respects_kind() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let inventory = inventory(dir.path());

        let all = inventory.search("WELL", ResourceKind::All);
        assert_eq!(all.data_files.len(), 1);
        assert!(all.scripts.is_empty());

        let scripts_only = inventory.search("depth", ResourceKind::Scripts);
        assert_eq!(scripts_only.scripts.len(), 1);
        assert!(scripts_only.data_files.is_empty());
    }

    #[test]
    fn test_read_data_file_with_or_without_extension() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let inventory = inventory(dir.path());

        assert_eq!(inventory.read_data_file("sample_well_01").unwrap(), "~VERSION\n");
        assert_eq!(inventory.read_data_file("sample_well_01.las").unwrap(), "~VERSION\n");
        let err = inventory.read_data_file("sample_well_09").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Data file 'sample_well_09' not found (available: sample_well_01.las)"
        );
    }

    #[test]
    fn test_read_script_lists_available_on_miss() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let inventory = inventory(dir.path());

        assert_eq!(inventory.read_script("depth_visualization.py").unwrap(), "plt.plot()\n");
        assert_eq!(inventory.read_script("depth_visualization").unwrap(), "plt.plot()\n");
        match inventory.read_script("porosity_calculator.py") {
            Err(RouterError::ResourceNotFound { kind, name, available }) => {
                assert_eq!(kind, "Script");
                assert_eq!(name, "porosity_calculator.py");
                assert_eq!(available, vec!["depth_visualization.py"]);
            }
            other => panic!("expected ResourceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_find_output_folder() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("output");
        fs::create_dir_all(out.join("2024-01-01_10-00-00")).unwrap();
        fs::create_dir_all(out.join("2024-03-05_08-30-00")).unwrap();
        fs::write(out.join("2024-03-05_08-30-00/depth.png"), [0u8; 4]).unwrap();
        fs::write(out.join("2024-03-05_08-30-00/run.log"), "ok").unwrap();
        let inventory = inventory(dir.path());

        let folder = inventory.find_output_folder("2024-03-05_08-30-00").unwrap();
        assert_eq!(folder.file_count(), 2);
        assert_eq!(folder.path, out.join("2024-03-05_08-30-00"));

        match inventory.find_output_folder("2023-12-31_00-00-00") {
            Err(RouterError::ResourceNotFound { available, .. }) => {
                assert_eq!(available, vec!["2024-03-05_08-30-00", "2024-01-01_10-00-00"]);
            }
            other => panic!("expected ResourceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_stem_strips_only_recognized_extension() {
        assert_eq!(stem_of("well.las", "las"), "well");
        assert_eq!(stem_of("well.v2.las", "las"), "well.v2");
        assert_eq!(stem_of("wellas", "las"), "wellas");
    }
}
