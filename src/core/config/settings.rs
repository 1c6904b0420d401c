use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment,
    parse_grading_backend, parse_u16, parse_u64, parse_usize,
};
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, GradingBackend, GradingSettings,
    QuizSettings, ResultsSettings, RuntimeSettings, ServerHost, ServerPort, ServerSettings,
    Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("KNOVA_HOST", "0.0.0.0");
        let port = env_or_default("KNOVA_PORT", "8000");

        let environment =
            parse_environment(env_optional("KNOVA_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("KNOVA_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "KNOVA");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "knova");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "knova");
        let database_url = env_optional("DATABASE_URL");

        let max_active_sessions = parse_usize(
            "QUIZ_MAX_ACTIVE_SESSIONS",
            env_or_default("QUIZ_MAX_ACTIVE_SESSIONS", "1000"),
        )?;
        let session_idle_minutes = parse_u64(
            "QUIZ_SESSION_IDLE_MINUTES",
            env_or_default("QUIZ_SESSION_IDLE_MINUTES", "120"),
        )?;

        let default_limit =
            parse_u64("RESULTS_DEFAULT_LIMIT", env_or_default("RESULTS_DEFAULT_LIMIT", "10"))?;
        let max_limit = parse_u64("RESULTS_MAX_LIMIT", env_or_default("RESULTS_MAX_LIMIT", "50"))?;

        let backend = parse_grading_backend(env_optional("GRADING_BACKEND"))?;
        let rest_url = env_or_default("GRADING_REST_URL", "");
        let rest_api_key = env_or_default("GRADING_REST_API_KEY", "");
        let request_timeout =
            parse_u64("GRADING_REQUEST_TIMEOUT", env_or_default("GRADING_REQUEST_TIMEOUT", "30"))?;

        let log_level = env_or_default("KNOVA_LOG_LEVEL", "info");
        let json = env_optional("KNOVA_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            quiz: QuizSettings { max_active_sessions, session_idle_minutes },
            results: ResultsSettings {
                default_limit: i64::try_from(default_limit).unwrap_or(i64::MAX),
                max_limit: i64::try_from(max_limit).unwrap_or(i64::MAX),
            },
            grading: GradingSettings { backend, rest_url, rest_api_key, request_timeout },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn quiz(&self) -> &QuizSettings {
        &self.quiz
    }

    pub(crate) fn results(&self) -> &ResultsSettings {
        &self.results
    }

    pub(crate) fn grading(&self) -> &GradingSettings {
        &self.grading
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.quiz.max_active_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "QUIZ_MAX_ACTIVE_SESSIONS",
                value: "0".to_string(),
            });
        }

        if self.results.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "RESULTS_DEFAULT_LIMIT",
                value: "0".to_string(),
            });
        }

        if self.results.default_limit > self.results.max_limit {
            return Err(ConfigError::InvalidValue {
                field: "RESULTS_DEFAULT_LIMIT",
                value: self.results.default_limit.to_string(),
            });
        }

        if self.grading.request_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "GRADING_REQUEST_TIMEOUT",
                value: "0".to_string(),
            });
        }

        if self.grading.backend == GradingBackend::Rest && self.grading.rest_url.is_empty() {
            return Err(ConfigError::MissingSecret("GRADING_REST_URL"));
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.grading.backend == GradingBackend::Rest && self.grading.rest_api_key.is_empty() {
            return Err(ConfigError::MissingSecret("GRADING_REST_API_KEY"));
        }

        Ok(())
    }
}
