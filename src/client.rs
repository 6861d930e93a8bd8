use std::{env, fs};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::workflow::{prompt, TextGenerator};

const CONFIG_FILE_PATH: &str = "config.toml";

/// Settings for talking to an OpenAI-compatible chat endpoint.
/// Every field has a default, so an empty `config.toml` is fine
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    /// how long one generation request may take before it counts as failed
    pub timeout_secs: u64,
    /// name of the environment variable holding the api key
    pub api_key_env: String,
    /// what we ask the generator to define
    pub task: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
            api_key_env: "OPENAI_API_KEY".to_string(),
            task: prompt::DEFAULT_TASK.to_string(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory
    pub fn load() -> Result<Config> {
        Config::from_path(CONFIG_FILE_PATH)
    }
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
        let buf = fs::read_to_string(path)?;
        buf.parse()
    }
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl FromStr for Config {
    type Err = Error;
    fn from_str(source: &str) -> Result<Config> {
        Ok(toml::from_str(source)?)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Blocking chat-completions client used as the rule generator
pub struct ChatClient {
    config: Config,
    api_key: Option<String>,
    http: HttpClient,
}

impl ChatClient {
    /// Build a client, reading the api key from the configured environment variable.
    /// A missing key is not an error here; local endpoints often do without one
    pub fn new(config: Config) -> Result<ChatClient> {
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|why| Error::Http(why.to_string()))?;
        let api_key = env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            warn!("`{}` is not set, sending requests without an api key", config.api_key_env);
        }
        Ok(ChatClient { config, api_key, http })
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }
    fn transport_error(&self, why: reqwest::Error) -> Error {
        if why.is_timeout() {
            Error::Timeout(self.config.timeout())
        } else {
            Error::Generation(why.to_string())
        }
    }
}

impl TextGenerator for ChatClient {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };
        let mut builder = self.http.post(self.endpoint()).json(&request);
        if let Some(key) = self.api_key.as_ref() {
            builder = builder.bearer_auth(key);
        }
        debug!("requesting completion from {} ({})", self.endpoint(), self.config.model);
        let response = builder.send().map_err(|why| self.transport_error(why))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Generation(format!("endpoint returned {}: {}", status, body)));
        }
        let body = response.text().map_err(|why| self.transport_error(why))?;
        let reply = serde_json::from_str::<ChatResponse>(&body)
            .map_err(|why| Error::Generation(format!("unexpected response shape: {}", why)))?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("response carried no message content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    #[test]
    fn empty_config_is_default() {
        let config: Config = "".parse().expect("empty config should parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }
    #[test]
    fn partial_config() {
        let config: Config = "model = \"gpt-4o-mini\"\ntimeout_secs = 5\n".parse().expect("should parse");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.api_base, "https://api.openai.com/v1");
    }
    #[test]
    fn bad_config_is_config_error() {
        let err = "timeout_secs = \"soon\"".parse::<Config>().expect_err("wrong type");
        assert!(matches!(err, Error::Config(_)));
    }
    #[test]
    fn config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "api_base = \"http://localhost:8080/v1/\"").expect("write");
        let config = Config::from_path(file.path()).expect("should load");
        assert_eq!(config.api_base, "http://localhost:8080/v1/");

        let client = ChatClient::new(config).expect("client builds");
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
    #[test]
    fn missing_file_is_io_error() {
        let err = Config::from_path("/definitely/not/here/config.toml").expect_err("no such file");
        assert!(matches!(err, Error::Io(_)));
    }

    /// Read one request off `stream`: headers, then `Content-Length` bytes of body
    fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).expect("read request");
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }
    /// Answer exactly one request with `status` and a json `body`; returns the api base to use
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).expect("write response");
        });
        format!("http://{}/v1", addr)
    }
    fn client_for(api_base: String, timeout_secs: u64) -> ChatClient {
        let config = Config {
            api_base,
            timeout_secs,
            api_key_env: "RULE_CHAINER_TEST_KEY".to_string(),
            ..Config::default()
        };
        ChatClient::new(config).expect("client builds")
    }

    #[test]
    fn reply_content_is_returned() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"parent(a, b)."}}]}"#;
        let mut client = client_for(serve_once("200 OK", body), 5);
        assert_eq!(client.generate("hi").expect("endpoint answers"), "parent(a, b).");
    }
    #[test]
    fn silent_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            // accept and hold the connection without ever answering
            let (stream, _) = listener.accept().expect("accept");
            thread::sleep(Duration::from_secs(5));
            drop(stream);
        });
        let mut client = client_for(format!("http://{}/v1", addr), 1);
        let err = client.generate("hi").expect_err("nobody answers");
        assert!(matches!(err, Error::Timeout(limit) if limit == Duration::from_secs(1)), "{:?}", err);
        assert!(err.is_collaborator_failure());
    }
    #[test]
    fn error_status_is_generation_failure() {
        let body = r#"{"error":"overloaded"}"#;
        let mut client = client_for(serve_once("503 Service Unavailable", body), 5);
        let err = client.generate("hi").expect_err("endpoint refused");
        match &err {
            Error::Generation(message) => {
                assert!(message.contains("503"), "{}", message);
                assert!(message.contains("overloaded"), "{}", message);
            }
            other => panic!("expected a generation error, got {:?}", other),
        }
        assert!(err.is_collaborator_failure());
    }
    #[test]
    fn malformed_reply_is_generation_failure() {
        let mut client = client_for(serve_once("200 OK", r#"{"answer":"parent(a, b)."}"#), 5);
        let err = client.generate("hi").expect_err("no choices field");
        match err {
            Error::Generation(message) => assert!(message.starts_with("unexpected response shape"), "{}", message),
            other => panic!("expected a generation error, got {:?}", other),
        }
    }
    #[test]
    fn empty_choices_is_generation_failure() {
        let mut client = client_for(serve_once("200 OK", r#"{"choices":[]}"#), 5);
        let err = client.generate("hi").expect_err("no content");
        assert!(matches!(err, Error::Generation(_)));
    }
}
