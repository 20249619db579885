use rth_core::Term;

fn module_attr(name: &str) -> String {
    format!("-module({}).\n", Term::atom(name))
}

pub(crate) fn plain_module(name: &str) -> String {
    let mut src = module_attr(name);
    src.push_str("-export([main/0]).\n\nmain() -> ok.\n");
    src
}

pub(crate) fn eunit_module(name: &str) -> String {
    let mut src = plain_module(name);
    src.push_str(concat!(
        "\n-ifdef(TEST).\n",
        "-include_lib(\"eunit/include/eunit.hrl\").\n\n",
        "some_test_() ->\n",
        "    ?_assertEqual(ok, main()).\n",
        "-endif.\n",
    ));
    src
}

pub(crate) fn eunit_suite(name: &str) -> String {
    let mut src = module_attr(&format!("{name}_tests"));
    src.push_str(concat!(
        "-include_lib(\"eunit/include/eunit.hrl\").\n\n",
        "basic_test() ->\n",
        "    ?assert(true).\n",
    ));
    src
}

pub(crate) fn plugin_module(name: &str) -> String {
    let mut src = module_attr(name);
    src.push_str("-export([init/1]).\n\ninit(State) ->\n    {ok, State}.\n");
    src
}

/// `{application, Name, [...]}.` resource body shared by `.app` and `.app.src`.
pub(crate) fn app_resource(name: &str, vsn: &str, modules: &[&str], deps: &[String]) -> String {
    let applications = ["kernel", "stdlib"]
        .into_iter()
        .map(Term::atom)
        .chain(deps.iter().map(|dep| Term::atom(dep.as_str())))
        .collect::<Vec<_>>();
    let props = Term::list([
        Term::tuple([Term::atom("description"), Term::string("")]),
        Term::tuple([Term::atom("vsn"), Term::string(vsn)]),
        Term::tuple([
            Term::atom("modules"),
            Term::list(modules.iter().map(|m| Term::atom(*m))),
        ]),
        Term::tuple([Term::atom("registered"), Term::list([])]),
        Term::tuple([Term::atom("applications"), Term::List(applications)]),
    ]);
    format!(
        "{}.\n",
        Term::tuple([Term::atom("application"), Term::atom(name), props])
    )
}
