//! Python template for the generated dispatcher program.

pub const DISPATCHER_TEMPLATE: &str = r#"# Generated by pyinstaller_bundle for {{package_name}}. Do not edit.
{{#each function_imports}}
from {{module}} import {{function}} as {{symbol}}
{{/each}}
{{#each module_imports}}
import {{this}}
{{/each}}
import collections
import importlib
import os
import runpy
import shutil
import sys
import traceback

SETUP_ALIASES = "setup_aliases"
EXTRACT = "extract"
EXTRACT_DIR = "./extracted_bundle/"

DispatcherOptions = collections.namedtuple(
    "DispatcherOptions",
    [
        "package_name",
        "sample_module",
        "interactive_alias",
        "profile",
        "debug",
        "process_override",
    ],
)


def load_options(environ):
    return DispatcherOptions(
        package_name="{{package_name}}",
        sample_module="{{sample_module}}",
        interactive_alias="{{interactive_alias}}",
        profile=bool(environ.get("{{profile_var}}")),
        debug=bool(environ.get("{{debug_var}}")),
        process_override=environ.get("{{process_var}}"),
    )


def interactive(options):
    try:
        from IPython import start_ipython
    except ImportError:
        import code

        code.interact(banner="{} interactive console".format(options.package_name))
        return 0
    return start_ipython(argv=[])


def run_module(module):
    runpy.run_module(module, run_name="__main__", alter_sys=True)
    return 0


def build_commands(options):
    commands = {}
    commands[options.interactive_alias] = lambda: interactive(options)
{{#each commands}}
{{#if symbol}}
    commands["{{alias}}"] = {{symbol}}
{{else}}
    commands["{{alias}}"] = lambda: run_module("{{module}}")
{{/if}}
{{/each}}
    return commands


def main_binary(argv):
    if getattr(sys, "frozen", False):
        return sys.executable
    return os.path.abspath(argv[0])


def setup_aliases(binary, aliases):
    base_dir = os.path.dirname(binary)
    for alias in aliases:
        if os.path.basename(binary) == alias:
            continue
        dst_path = os.path.join(base_dir, alias)
        try:
            if os.path.lexists(dst_path):
                os.unlink(dst_path)
            os.link(binary, dst_path)
        except OSError as exc:
            print("Failed to create the link: {} -> {} ({})".format(binary, dst_path, exc))
    return 0


def extract(base_dir, destination):
    if os.path.exists(destination):
        shutil.rmtree(destination)
    shutil.copytree(base_dir, destination)
    return 0


def exit_status(code):
    if code is None:
        return 0
    if isinstance(code, int):
        return code
    sys.stderr.write("{}\n".format(code))
    return 1


def unrecognized(program_name, args):
    indent = len(program_name) * " "
    sys.stderr.write("{}: unrecognized command {!r}\n".format(program_name, " ".join(args)))
    sys.stderr.write(indent + "  known commands: {}, {}\n".format(SETUP_ALIASES, EXTRACT))
    return 2


def resolve_process_name(program_name, commands, options):
    if program_name not in commands and options.process_override:
        return options.process_override
    return program_name


def main(options, commands, argv):
    program_name = os.path.basename(argv[0]) if argv else options.package_name
    try:
        sample = importlib.import_module(options.sample_module)
        sample_dir = os.path.realpath(os.path.dirname(sample.__file__))
        base_dir = os.path.dirname(sample_dir)

        try:
            if len(argv) == 2 and argv[1] == SETUP_ALIASES:
                return setup_aliases(main_binary(argv), list(commands.keys()))
            if len(argv) == 2 and argv[1] == EXTRACT:
                return extract(base_dir, EXTRACT_DIR)

            process_name = resolve_process_name(program_name, commands, options)
            action = commands.get(process_name)
            if action is None:
                if len(argv) > 1:
                    return unrecognized(program_name, argv[1:])
                action = commands[options.interactive_alias]
            result = action()
            return result if isinstance(result, int) else 0
        except SystemExit as exc:
            return exit_status(exc.code)
        except Exception:
            exc_type, exc_value, _ = sys.exc_info()
            sys.stderr.write(
                "ERROR: {}: {}\n{}".format(exc_type.__name__, exc_value, traceback.format_exc(15))
            )
            if options.debug:
                import pdb

                pdb.post_mortem()
            return 1
    except Exception as exc:
        indent = len(program_name) * " "
        sys.stderr.write(program_name + ": " + repr(exc) + "\n")
        sys.stderr.write(indent + "  for help use --help\n")
        return 2


def profile(options, commands, argv):
    import cProfile
    import io
    import pstats

    profile_filename = "{}_profile.bin".format(options.package_name)
    profiler = cProfile.Profile()
    status = profiler.runcall(main, options, commands, argv)
    profiler.dump_stats(profile_filename)
    out_stream = io.StringIO()
    stats = pstats.Stats(profile_filename, stream=out_stream)
    stats.strip_dirs().sort_stats("cumulative").print_stats()
    with open("{}_profile_stats.txt".format(options.package_name), "w") as statsfile:
        statsfile.write(out_stream.getvalue())
    return status


if __name__ == "__main__":
    OPTIONS = load_options(os.environ)
    COMMANDS = build_commands(OPTIONS)
    if OPTIONS.profile:
        sys.exit(profile(OPTIONS, COMMANDS, sys.argv))
    sys.exit(main(OPTIONS, COMMANDS, sys.argv))
"#;
