use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    tomcat-provisioner completions --shell bash > ~/.bash_completion.d/tomcat-provisioner\n\n\
                  Generate zsh completions:\n    tomcat-provisioner completions --shell zsh > ~/.zfunc/_tomcat-provisioner\n\n\
                  Generate fish completions:\n    tomcat-provisioner completions --shell fish > ~/.config/fish/completions/tomcat-provisioner.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(long, value_enum, ignore_case = true)]
    pub shell: Shell,
}
