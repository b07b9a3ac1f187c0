//! User-facing strings in English and Polish.
//!
//! A [`Translator`] is built once from [`Language`] and handed to whatever
//! needs to print. Lookups fall back to English, then to the key itself, so a
//! missing entry never fails a command.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interface language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Pl,
}

impl Language {
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Pl => "pl",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language '{0}' (expected 'en' or 'pl')")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "pl" => Ok(Self::Pl),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Looks up translated strings for one language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Translator {
    language: Language,
}

impl Translator {
    pub const fn new(language: Language) -> Self {
        Self { language }
    }

    pub const fn language(&self) -> Language {
        self.language
    }

    /// Translated text for `key`.
    pub fn t(&self, key: &str) -> String {
        self.lookup(key).to_string()
    }

    /// Translated text with `{name}` placeholders replaced.
    ///
    /// Placeholders without a matching argument are left as-is.
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.lookup(key).to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }

    fn lookup<'a>(&self, key: &'a str) -> &'a str {
        let table = match self.language {
            Language::En => EN,
            Language::Pl => PL,
        };
        find(table, key).or_else(|| find(EN, key)).unwrap_or(key)
    }
}

fn find(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find_map(|(k, v)| (*k == key).then_some(*v))
}

const EN: &[(&str, &str)] = &[
    ("auto_detected", "Auto-detected: {hardware_type}"),
    ("hardware_info_table", "Hardware information"),
    ("property", "Property"),
    ("value", "Value"),
    ("description", "Description"),
    ("cmake_flags_label", "CMAKE flags"),
    ("dependencies_label", "Dependencies"),
    ("more_flags", "... and {count} more"),
    ("more_deps", "... and {count} more"),
    ("hardware_type", "Hardware type"),
    ("system", "System"),
    ("architecture", "Architecture"),
    ("processor", "Processor"),
    ("ram_memory", "RAM memory"),
    ("physical_cores", "Physical cores"),
    ("logical_cores", "Logical cores"),
    ("avx_support", "AVX support"),
    ("avx2_support", "AVX2 support"),
    ("suggested_optimizations", "Suggested optimizations"),
    ("yes", "yes"),
    ("no", "no"),
    ("cpu_features", "CPU features claimed by the hardware descriptor"),
    ("probing", "Probing compiler and CPU capabilities, this can take a few minutes..."),
    ("final_flags", "Confirmed CMAKE flags"),
    ("installation_for", "llama.cpp installation for: {hardware_type}"),
    ("installation_directory_label", "Installation directory: {install_dir}"),
    ("config_option", "Custom flags file"),
    ("starting_installation", "Starting installation..."),
    ("checking_dependencies", "Checking dependencies..."),
    ("missing_dependencies", "Missing dependencies: {deps}"),
    ("installing_dependencies", "Installing dependencies..."),
    ("dependencies_ok", "All dependencies are installed"),
    ("dependencies_not_installed", "Required system dependencies are not installed"),
    (
        "install_dependencies_manually",
        "To install missing dependencies, run the following commands:",
    ),
    ("unknown_package_manager", "No known package manager detected, install these packages manually:"),
    ("run_installer_again", "Then run the installer again."),
    ("installation_interrupted", "Installation interrupted - missing system dependencies"),
    ("downloading_llama", "Downloading llama.cpp from GitHub..."),
    ("downloaded_to", "llama.cpp downloaded to {path}"),
    ("configuring_build", "Configuring CMake..."),
    ("configure_complete", "CMake configuration completed"),
    ("compilation_flags", "Compiling with optimization flags:"),
    ("starting_compilation", "Starting compilation on {cores} cores..."),
    ("compilation_complete", "Compilation completed successfully"),
    ("creating_wrapper_scripts", "Creating wrapper scripts..."),
    ("wrapper_created", "Created wrapper: {path}"),
    ("no_executables", "No executables found in the build directory"),
    ("installation_complete", "Installation completed successfully!"),
    ("installation_error", "Installation error: {error}"),
    ("run_hint", "Run: {path} --help"),
    ("elapsed", "Elapsed time: {seconds}s"),
    ("config_created", "Created configuration file: {path}"),
    ("config_usage", "Edit the file and use: ggforge install --config {path}"),
    ("config_file_not_exists", "Configuration file does not exist: {path}"),
    ("file_creation_error", "File creation error: {error}"),
    ("select_hardware_type", "Select a hardware type with --hardware or enable auto-detection"),
    ("list_configs_hint", "Use: ggforge list-configs"),
    ("cannot_create_directory", "Cannot create directory {directory}: {error}"),
    ("probe_summary", "Summary"),
    ("flag_source", "Flag source: {source}"),
    (
        "config_template_header",
        "# CMAKE configuration for llama.cpp\n\
         # Generated for hardware type: {hardware_type}\n\
         #\n\
         # Edit these flags as needed, then use:\n\
         # ggforge install --config {path}\n\
         #\n\
         # Lines starting with # are comments and will be ignored\n",
    ),
    ("hardware_rpi5_8gb", "Raspberry Pi 5 8GB - full ARM64 optimizations with OpenBLAS and RPC"),
    ("hardware_rpi5_16gb", "Raspberry Pi 5 16GB - maximum ARM64 optimizations with OpenBLAS and RPC"),
    ("hardware_rpi5_4gb", "Raspberry Pi 5 4GB - balanced ARM64 optimizations"),
    ("hardware_rpi4", "Raspberry Pi 4 - Cortex-A72 optimizations with OpenBLAS"),
    ("hardware_rpi_other", "Other Raspberry Pi - basic ARM optimizations"),
    ("hardware_termux", "Termux Android - minimal optimizations without BLAS"),
    ("hardware_dynamic", "Linux x86_64 - automatic CPU detection and optimization"),
    ("hardware_x86_linux", "Linux x86_64 - full AVX2 optimizations with OpenBLAS"),
    ("hardware_x86_linux_old", "Linux x86_64 (older CPUs) - AVX optimizations without AVX2"),
    (
        "hardware_x86_linux_minimal",
        "Linux x86_64 (very old CPUs) - minimal optimizations without AVX",
    ),
    ("hardware_no_optimization", "No optimizations - maximum compatibility"),
    ("hardware_unknown", "Unknown hardware type"),
];

const PL: &[(&str, &str)] = &[
    ("auto_detected", "Automatycznie wykryty: {hardware_type}"),
    ("hardware_info_table", "Informacje o sprzęcie"),
    ("property", "Właściwość"),
    ("value", "Wartość"),
    ("description", "Opis"),
    ("cmake_flags_label", "Flagi CMAKE"),
    ("dependencies_label", "Zależności"),
    ("more_flags", "... i {count} więcej"),
    ("more_deps", "... i {count} więcej"),
    ("hardware_type", "Typ sprzętu"),
    ("system", "System"),
    ("architecture", "Architektura"),
    ("processor", "Procesor"),
    ("ram_memory", "Pamięć RAM"),
    ("physical_cores", "Rdzenie fizyczne"),
    ("logical_cores", "Rdzenie logiczne"),
    ("avx_support", "Obsługa AVX"),
    ("avx2_support", "Obsługa AVX2"),
    ("suggested_optimizations", "Sugerowane optymalizacje"),
    ("yes", "tak"),
    ("no", "nie"),
    ("cpu_features", "Funkcje CPU zgłaszane przez opis sprzętu"),
    ("probing", "Testowanie możliwości kompilatora i CPU, to może potrwać kilka minut..."),
    ("final_flags", "Potwierdzone flagi CMAKE"),
    ("installation_for", "Instalacja llama.cpp dla: {hardware_type}"),
    ("installation_directory_label", "Katalog instalacji: {install_dir}"),
    ("config_option", "Plik z własnymi flagami"),
    ("starting_installation", "Rozpoczynam instalację..."),
    ("checking_dependencies", "Sprawdzanie zależności..."),
    ("missing_dependencies", "Brakuje zależności: {deps}"),
    ("installing_dependencies", "Instalowanie zależności..."),
    ("dependencies_ok", "Wszystkie zależności są zainstalowane"),
    ("dependencies_not_installed", "Wymagane zależności systemowe nie są zainstalowane"),
    (
        "install_dependencies_manually",
        "Aby zainstalować brakujące zależności, wykonaj poniższe komendy:",
    ),
    ("unknown_package_manager", "Nie wykryto znanego menedżera pakietów, zainstaluj ręcznie:"),
    ("run_installer_again", "Następnie uruchom ponownie instalator."),
    ("installation_interrupted", "Instalacja przerwana - brakują zależności systemowe"),
    ("downloading_llama", "Pobieranie llama.cpp z GitHub..."),
    ("downloaded_to", "llama.cpp pobrane do {path}"),
    ("configuring_build", "Konfiguracja CMake..."),
    ("configure_complete", "Konfiguracja CMake zakończona pomyślnie"),
    ("compilation_flags", "Kompilacja z flagami optymalizacji:"),
    ("starting_compilation", "Rozpoczynam kompilację na {cores} rdzeniach..."),
    ("compilation_complete", "Kompilacja zakończona pomyślnie"),
    ("creating_wrapper_scripts", "Tworzenie skryptów uruchomieniowych..."),
    ("wrapper_created", "Utworzono skrypt: {path}"),
    ("no_executables", "Nie znaleziono plików wykonywalnych"),
    ("installation_complete", "Instalacja zakończona pomyślnie!"),
    ("installation_error", "Błąd instalacji: {error}"),
    ("run_hint", "Uruchom: {path} --help"),
    ("elapsed", "Czas instalacji: {seconds}s"),
    ("config_created", "Utworzono plik konfiguracji: {path}"),
    ("config_usage", "Edytuj plik i użyj: ggforge install --config {path}"),
    ("config_file_not_exists", "Plik konfiguracji nie istnieje: {path}"),
    ("file_creation_error", "Błąd tworzenia pliku: {error}"),
    ("select_hardware_type", "Wybierz typ sprzętu przez --hardware lub włącz automatyczne wykrywanie"),
    ("list_configs_hint", "Użyj: ggforge list-configs"),
    ("cannot_create_directory", "Nie można utworzyć katalogu {directory}: {error}"),
    ("probe_summary", "Podsumowanie"),
    ("flag_source", "Źródło flag: {source}"),
    (
        "config_template_header",
        "# Konfiguracja CMAKE dla llama.cpp\n\
         # Wygenerowane dla typu sprzętu: {hardware_type}\n\
         #\n\
         # Edytuj te flagi według potrzeb, następnie użyj:\n\
         # ggforge install --config {path}\n\
         #\n\
         # Linie zaczynające się od # są komentarzami i będą ignorowane\n",
    ),
    ("hardware_rpi5_8gb", "Raspberry Pi 5 8GB - pełne optymalizacje ARM64 z OpenBLAS i RPC"),
    ("hardware_rpi5_16gb", "Raspberry Pi 5 16GB - maksymalne optymalizacje ARM64 z OpenBLAS i RPC"),
    ("hardware_rpi5_4gb", "Raspberry Pi 5 4GB - zrównoważone optymalizacje ARM64"),
    ("hardware_rpi4", "Raspberry Pi 4 - optymalizacje Cortex-A72 z OpenBLAS"),
    ("hardware_rpi_other", "Inne Raspberry Pi - podstawowe optymalizacje ARM"),
    ("hardware_termux", "Termux Android - minimalne optymalizacje bez BLAS"),
    ("hardware_dynamic", "Linux x86_64 - automatyczne wykrywanie i optymalizacja CPU"),
    ("hardware_x86_linux", "Linux x86_64 - pełne optymalizacje AVX2 z OpenBLAS"),
    ("hardware_x86_linux_old", "Linux x86_64 (starsze CPU) - optymalizacje AVX bez AVX2"),
    (
        "hardware_x86_linux_minimal",
        "Linux x86_64 (bardzo stare CPU) - minimalne optymalizacje bez AVX",
    ),
    ("hardware_no_optimization", "Bez optymalizacji - kompatybilność maksymalna"),
    ("hardware_unknown", "Nieznany typ sprzętu"),
];
